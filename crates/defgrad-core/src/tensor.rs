//! Moving `f64` host data in and out of backend tensors.
//!
//! Values are handed to the backend in its own float element, so an `f64`
//! backend keeps full precision and an `f32` backend rounds once on upload.

use burn::tensor::backend::Backend;
use burn::tensor::{Shape, Tensor, TensorData};

/// Upload row-major `values` as a float tensor of `shape`.
pub fn float_tensor<B: Backend, const R: usize>(values: Vec<f64>, shape: [usize; R], device: &B::Device) -> Tensor<B, R> {
    let data = TensorData::new(values, Shape::new(shape)).convert::<B::FloatElem>();
    Tensor::from_data(data, device)
}

/// Read every element of a tensor back as `f64`, in row-major order.
pub fn tensor_values<B: Backend, const R: usize>(tensor: Tensor<B, R>) -> Vec<f64> {
    tensor.into_data().iter::<f64>().collect()
}
