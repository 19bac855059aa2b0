/*
 * @Description  : Layer 模块：由张量运算组合出的常见网络结构
 */

mod linear;

pub use linear::Linear;
