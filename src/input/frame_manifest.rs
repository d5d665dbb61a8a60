// 该文件是 Shanan （山南西风） 项目的一部分。
// src/input/frame_manifest.rs - 帧清单输入
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

//! 清单为 JSON Lines 文件，每行一帧：
//! `{"image": "frame-0001.jpg", "label": "person", "x": [..], ...}`。
//! 图像路径相对于清单所在目录。

use std::{
  fs::File,
  io::{BufRead, BufReader, Lines},
  path::{Path, PathBuf},
};

use image::ImageReader;
use serde::Deserialize;
use thiserror::Error;
use tracing::{debug, error};
use url::Url;

use crate::{FromUrl, FromUrlWithScheme, input::Frame, record::DetectionRecord};

#[derive(Error, Debug)]
pub enum FrameManifestInputError {
  #[error("URI 方案不匹配")]
  SchemeMismatch,
  #[error("I/O 错误: {0}")]
  IoError(#[from] std::io::Error),
  #[error("第 {line} 行解析错误: {source}")]
  ParseError {
    line: usize,
    source: serde_json::Error,
  },
  #[error("图像 `{}` 加载错误: {source}", .path.display())]
  ImageLoadError {
    path: PathBuf,
    source: image::ImageError,
  },
}

#[derive(Debug, Deserialize)]
struct FrameEntry {
  image: PathBuf,
  #[serde(flatten)]
  record: DetectionRecord,
}

pub struct FrameManifestInput {
  base: PathBuf,
  lines: Lines<BufReader<File>>,
  line: usize,
  index: usize,
}

impl FromUrlWithScheme for FrameManifestInput {
  const SCHEME: &'static str = "frames";
}

impl FromUrl for FrameManifestInput {
  type Error = FrameManifestInputError;

  fn from_url(url: &Url) -> Result<Self, Self::Error> {
    if url.scheme() != Self::SCHEME {
      error!(
        "URI 方案不匹配: 期望 '{}', 实际 '{}'",
        Self::SCHEME,
        url.scheme()
      );
      return Err(FrameManifestInputError::SchemeMismatch);
    }

    Self::open(url.path())
  }
}

impl FrameManifestInput {
  pub fn open(path: impl AsRef<Path>) -> Result<Self, FrameManifestInputError> {
    let path = path.as_ref();
    let file = File::open(path)?;
    let base = path
      .parent()
      .map(Path::to_path_buf)
      .unwrap_or_default();
    debug!("打开帧清单: {}", path.display());

    Ok(Self {
      base,
      lines: BufReader::new(file).lines(),
      line: 0,
      index: 0,
    })
  }

  fn read_frame(&self, line: &str) -> Result<Frame, FrameManifestInputError> {
    let entry: FrameEntry =
      serde_json::from_str(line).map_err(|source| FrameManifestInputError::ParseError {
        line: self.line,
        source,
      })?;

    let path = self.base.join(&entry.image);
    let image = ImageReader::open(&path)?
      .decode()
      .map_err(|source| FrameManifestInputError::ImageLoadError {
        path: path.clone(),
        source,
      })?;

    Ok(Frame {
      index: self.index,
      image: image.into_rgb8(),
      record: entry.record,
    })
  }
}

impl Iterator for FrameManifestInput {
  type Item = Result<Frame, FrameManifestInputError>;

  fn next(&mut self) -> Option<Self::Item> {
    loop {
      let line = match self.lines.next()? {
        Ok(line) => line,
        Err(e) => return Some(Err(e.into())),
      };
      self.line += 1;
      if line.trim().is_empty() {
        continue;
      }

      let frame = self.read_frame(&line);
      self.index += 1;
      return Some(frame);
    }
  }
}
