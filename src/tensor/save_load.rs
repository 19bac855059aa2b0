use std::fs::File;
use std::io::{BufReader, BufWriter, Read, Write};
use std::path::Path;

use ndarray::ArrayD;
use ndarray_npy::{ReadNpyExt, WriteNpyExt};

use super::Tensor;
use crate::errors::TensorError;

// 保存和加载张量
impl Tensor {
    /// 将单个Tensor写入（bincode格式）
    pub fn save<W: Write>(&self, writer: &mut W) -> Result<(), TensorError> {
        bincode::serialize_into(writer, &self.data)
            .map_err(|e| TensorError::Serialization(e.to_string()))
    }

    /// 读取由`save`写入的单个Tensor
    pub fn load<R: Read>(reader: &mut R) -> Result<Self, TensorError> {
        let data = bincode::deserialize_from(reader)
            .map_err(|e| TensorError::Serialization(e.to_string()))?;
        Ok(Self { data })
    }

    /// 导出为`.npy`文件，便于在 NumPy/Matplotlib 中查看热力图
    pub fn save_npy<P: AsRef<Path>>(&self, path: P) -> Result<(), TensorError> {
        let file = File::create(path).map_err(|e| TensorError::Serialization(e.to_string()))?;
        self.data
            .as_standard_layout()
            .write_npy(BufWriter::new(file))
            .map_err(|e| TensorError::Serialization(e.to_string()))
    }

    /// 从`.npy`文件加载
    pub fn load_npy<P: AsRef<Path>>(path: P) -> Result<Self, TensorError> {
        let file = File::open(path).map_err(|e| TensorError::Serialization(e.to_string()))?;
        let data = ArrayD::<f32>::read_npy(BufReader::new(file))
            .map_err(|e| TensorError::Serialization(e.to_string()))?;
        Ok(Self { data })
    }
}
