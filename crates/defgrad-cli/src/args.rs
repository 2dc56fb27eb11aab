//! Command line arguments.
//!
//! The classic single-dash flags (`-stride 2`, `-invert`, `-Rx1 10`, ...) are
//! rewritten to their long forms before `clap` sees them.

use std::ffi::OsString;
use std::path::PathBuf;

use clap::{Parser, ValueEnum};
use defgrad_field::{FieldConfig, ProbeSample, RoiRequest};

/// Single-dash flags and the long options they stand for.
const LEGACY_FLAGS: &[(&str, &str)] = &[
    ("-stride", "--stride"),
    ("-invert", "--invert"),
    ("-Rx1", "--rx1"),
    ("-Rx2", "--rx2"),
    ("-Ry1", "--ry1"),
    ("-Ry2", "--ry2"),
    ("-Rz1", "--rz1"),
    ("-Rz2", "--rz2"),
    ("-Rt1", "--rt1"),
    ("-Rt2", "--rt2"),
];

/// Rewrite single-dash flags to their long forms; everything else passes through.
pub fn normalize_legacy_flags<I>(args: I) -> Vec<OsString>
where
    I: IntoIterator,
    I::Item: Into<OsString>,
{
    args.into_iter()
        .map(Into::into)
        .map(|arg| {
            LEGACY_FLAGS
                .iter()
                .find(|(legacy, _)| arg.to_str() == Some(*legacy))
                .map(|(_, long)| OsString::from(*long))
                .unwrap_or(arg)
        })
        .collect()
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
pub enum OutputExtension {
    #[value(name = "nii")]
    Nii,
    #[value(name = "nii.gz")]
    NiiGz,
}

impl OutputExtension {
    fn as_str(self) -> &'static str {
        match self {
            Self::Nii => "nii",
            Self::NiiGz => "nii.gz",
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
pub enum ProbeArg {
    /// Last sub-sample of the probe cell
    Last,
    /// Mean over the probe cell
    Mean,
}

#[derive(Parser, Debug)]
#[command(name = "dof2f")]
#[command(about = "Write the deformation gradient tensor field of a transformation as nine volumes")]
#[command(version, allow_negative_numbers = true)]
pub struct Cli {
    /// Image defining the sampling grid
    pub image: PathBuf,

    /// Transformation file (JSON descriptor)
    pub transformation: PathBuf,

    /// Output prefix; components are written to <output>_f<row><col>.<ext>
    pub output: PathBuf,

    /// Average stride³ samples per output voxel
    #[arg(long, default_value_t = 1)]
    pub stride: i64,

    /// Invert each sample tensor before averaging
    #[arg(long)]
    pub invert: bool,

    /// Region of interest, first x index
    #[arg(long)]
    pub rx1: Option<i64>,
    /// Region of interest, end x index (exclusive)
    #[arg(long)]
    pub rx2: Option<i64>,
    /// Region of interest, first y index
    #[arg(long)]
    pub ry1: Option<i64>,
    /// Region of interest, end y index (exclusive)
    #[arg(long)]
    pub ry2: Option<i64>,
    /// Region of interest, first z index
    #[arg(long)]
    pub rz1: Option<i64>,
    /// Region of interest, end z index (exclusive)
    #[arg(long)]
    pub rz2: Option<i64>,
    /// Region of interest, first frame
    #[arg(long)]
    pub rt1: Option<i64>,
    /// Region of interest, end frame (exclusive)
    #[arg(long)]
    pub rt2: Option<i64>,

    /// Output file extension
    #[arg(long, value_enum, default_value_t = OutputExtension::Nii)]
    pub ext: OutputExtension,

    /// Sample compared against the analytic Jacobian at the image centre
    #[arg(long, value_enum, default_value_t = ProbeArg::Last)]
    pub probe: ProbeArg,
}

impl Cli {
    /// Parse classic or long-form arguments.
    pub fn parse_legacy<I>(args: I) -> Result<Self, clap::Error>
    where
        I: IntoIterator,
        I::Item: Into<OsString>,
    {
        Self::try_parse_from(normalize_legacy_flags(args))
    }

    pub fn roi(&self) -> RoiRequest {
        RoiRequest {
            start: [self.rx1, self.ry1, self.rz1, self.rt1],
            end: [self.rx2, self.ry2, self.rz2, self.rt2],
        }
    }

    pub fn field_config(&self) -> FieldConfig {
        FieldConfig::new()
            .with_stride(self.stride)
            .with_invert(self.invert)
            .with_roi(self.roi())
            .with_probe(match self.probe {
                ProbeArg::Last => ProbeSample::LastSubSample,
                ProbeArg::Mean => ProbeSample::CellMean,
            })
            .with_extension(self.ext.as_str())
    }
}
