// 该文件是 Shanan （山南西风） 项目的一部分。
// src/output/save_annotated_image.rs - 保存标注图像
//
// 本文件根据 Apache 许可证第 2.0 版（以下简称“许可证”）授权使用；
// 除非遵守该许可证条款，否则您不得使用本文件。
// 您可通过以下网址获取许可证副本：
// http://www.apache.org/licenses/LICENSE-2.0
// 除非适用法律要求或书面同意，根据本许可协议分发的软件均按“原样”提供，
// 不附带任何形式的明示或暗示的保证或条件。
// 有关许可权限与限制的具体条款，请参阅本许可协议。
//
// Copyright (C) 2026 Johann Li <me@qinka.pro>, Wareless Group

use std::path::PathBuf;

use image::{ImageFormat, RgbImage};
use thiserror::Error;
use tracing::info;
use url::Url;

use crate::{FromUrl, FromUrlWithScheme, config::ImageEncoding};

#[derive(Error, Debug)]
pub enum SaveAnnotatedImageError {
  #[error("URI 方案不匹配")]
  SchemeMismatch,
  #[error("输出编码 {0:?} 不能写入文件")]
  UnsupportedEncoding(ImageEncoding),
  #[error("I/O 错误: {0}")]
  IoError(#[from] std::io::Error),
  #[error("图像错误: {0}")]
  ImageError(#[from] image::ImageError),
}

/// 将标注后的帧按序号写入目录
pub struct SaveAnnotatedImageOutput {
  directory: PathBuf,
  encoding: ImageEncoding,
}

impl FromUrlWithScheme for SaveAnnotatedImageOutput {
  const SCHEME: &'static str = "folder";
}

impl FromUrl for SaveAnnotatedImageOutput {
  type Error = SaveAnnotatedImageError;

  fn from_url(uri: &Url) -> Result<Self, Self::Error> {
    if uri.scheme() != Self::SCHEME {
      return Err(SaveAnnotatedImageError::SchemeMismatch);
    }

    Ok(SaveAnnotatedImageOutput {
      directory: PathBuf::from(uri.path()),
      encoding: ImageEncoding::Jpg,
    })
  }
}

impl SaveAnnotatedImageOutput {
  pub fn with_encoding(mut self, encoding: ImageEncoding) -> Self {
    self.encoding = encoding;
    self
  }

  pub fn frame_path(&self, index: usize) -> Result<PathBuf, SaveAnnotatedImageError> {
    let extension = self
      .encoding
      .extension()
      .ok_or(SaveAnnotatedImageError::UnsupportedEncoding(self.encoding))?;
    Ok(self.directory.join(format!("frame-{:06}.{}", index, extension)))
  }

  pub fn save(&self, index: usize, image: &RgbImage) -> Result<PathBuf, SaveAnnotatedImageError> {
    let path = self.frame_path(index)?;
    let format = match self.encoding {
      ImageEncoding::Png => ImageFormat::Png,
      ImageEncoding::Jpg => ImageFormat::Jpeg,
      ImageEncoding::Wide => {
        return Err(SaveAnnotatedImageError::UnsupportedEncoding(self.encoding));
      }
    };

    if !self.directory.as_os_str().is_empty() {
      std::fs::create_dir_all(&self.directory)?;
    }
    image.save_with_format(&path, format)?;
    info!("保存标注图像到文件: {}", path.display());

    Ok(path)
  }
}
