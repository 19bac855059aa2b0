/*
 * @Description  : Module trait 定义
 */

use crate::tensor::Tensor;

/// 模块 trait
///
/// # 设计原则
/// - `forward()` **不是** trait 方法（签名各异）
/// - `new()` **不是** trait 方法（参数各异）
/// - `parameters()` 按固定顺序返回参数张量，保存/加载依赖这一顺序
///
/// # 使用示例
///
/// ```ignore
/// use nar_decoder::nn::{Activation, Linear, Module};
///
/// struct Mlp {
///     fc1: Linear,
///     fc2: Linear,
/// }
///
/// impl Module for Mlp {
///     fn parameters(&self) -> Vec<&Tensor> {
///         [self.fc1.parameters(), self.fc2.parameters()].concat()
///     }
/// }
/// ```
pub trait Module {
    /// 获取所有参数
    fn parameters(&self) -> Vec<&Tensor>;

    /// 获取参数张量的个数
    fn num_params(&self) -> usize {
        self.parameters().len()
    }

    /// 获取参数的标量总数
    fn num_elements(&self) -> usize {
        self.parameters().iter().map(|p| p.size()).sum()
    }
}
