// 该文件是 Shanan （山南西风） 项目的一部分。
// src/config.rs - 标注配置
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

use serde::Deserialize;
use tracing::{error, info};

use crate::error::ConfigError;

const DEFAULT_OBJECT_LABEL_SEPARATOR: &str = ",";
const KEYPOINT_LABEL_SEPARATOR: char = ',';

/// 标注配置，只能通过 [`AnnotateConfigBuilder`] 构建，构建后不可修改
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AnnotateConfig {
  object_label_separator: String,
  keypoint_labels: Vec<String>,
}

impl AnnotateConfig {
  pub fn builder() -> AnnotateConfigBuilder {
    AnnotateConfigBuilder::default()
  }

  pub fn object_label_separator(&self) -> &str {
    &self.object_label_separator
  }

  pub fn keypoint_labels(&self) -> &[String] {
    &self.keypoint_labels
  }

  /// 按编号查找关键点标签，编号越界时返回 `None`
  pub fn keypoint_label(&self, label_id: i64) -> Option<&str> {
    usize::try_from(label_id)
      .ok()
      .and_then(|id| self.keypoint_labels.get(id))
      .map(String::as_str)
  }
}

#[derive(Debug, Clone)]
pub struct AnnotateConfigBuilder {
  object_label_separator: String,
  keypoint_labels: Vec<String>,
}

impl Default for AnnotateConfigBuilder {
  fn default() -> Self {
    Self {
      object_label_separator: DEFAULT_OBJECT_LABEL_SEPARATOR.to_string(),
      keypoint_labels: Vec::new(),
    }
  }
}

impl AnnotateConfigBuilder {
  pub fn object_label_separator(mut self, separator: impl Into<String>) -> Self {
    self.object_label_separator = separator.into();
    self
  }

  pub fn keypoint_labels<I, S>(mut self, labels: I) -> Self
  where
    I: IntoIterator<Item = S>,
    S: Into<String>,
  {
    self.keypoint_labels = labels.into_iter().map(Into::into).collect();
    self
  }

  /// 以逗号分隔的字符串设置关键点标签，例如 `nose,l_eye,r_eye`
  pub fn keypoint_labels_str(self, labels: &str) -> Self {
    if labels.is_empty() {
      return self.keypoint_labels(Vec::<String>::new());
    }
    self.keypoint_labels(labels.split(KEYPOINT_LABEL_SEPARATOR))
  }

  pub fn build(self) -> Result<AnnotateConfig, ConfigError> {
    if self.object_label_separator.is_empty() {
      error!("目标标签分隔符未设置");
      return Err(ConfigError::EmptySeparator);
    }

    info!("使用 `{}` 作为目标标签分隔符", self.object_label_separator);
    if self.keypoint_labels.is_empty() {
      info!("未设置关键点标签");
    } else {
      info!("使用关键点标签: {}", self.keypoint_labels.join(","));
    }

    Ok(AnnotateConfig {
      object_label_separator: self.object_label_separator,
      keypoint_labels: self.keypoint_labels,
    })
  }
}

/// 图像编码方式
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ImageEncoding {
  Wide,
  Jpg,
  Png,
}

impl ImageEncoding {
  pub fn extension(&self) -> Option<&'static str> {
    match self {
      ImageEncoding::Wide => None,
      ImageEncoding::Jpg => Some("jpg"),
      ImageEncoding::Png => Some("png"),
    }
  }
}

impl std::str::FromStr for ImageEncoding {
  type Err = ConfigError;

  fn from_str(s: &str) -> Result<Self, Self::Err> {
    match s {
      "wide" => Ok(ImageEncoding::Wide),
      "jpg" => Ok(ImageEncoding::Jpg),
      "png" => Ok(ImageEncoding::Png),
      other => Err(ConfigError::UnsupportedEncoding(other.to_string())),
    }
  }
}

/// 窗口初始化设置，字段名与流处理设置保持一致
#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct AnnotateSettings {
  pub input_image_encoding: String,
  pub output_image_encoding: String,
  pub object_label_separator: String,
  pub kpts_labels: String,
}

impl Default for AnnotateSettings {
  fn default() -> Self {
    Self {
      input_image_encoding: "wide".to_string(),
      output_image_encoding: "jpg".to_string(),
      object_label_separator: DEFAULT_OBJECT_LABEL_SEPARATOR.to_string(),
      kpts_labels: String::new(),
    }
  }
}

/// 校验后的设置
#[derive(Debug, Clone)]
pub struct ValidatedSettings {
  pub input_image_encoding: ImageEncoding,
  pub output_image_encoding: ImageEncoding,
  pub config: AnnotateConfig,
}

impl AnnotateSettings {
  pub fn from_json_str(s: &str) -> Result<Self, serde_json::Error> {
    serde_json::from_str(s)
  }

  pub fn validate(self) -> Result<ValidatedSettings, ConfigError> {
    let input_image_encoding = self
      .input_image_encoding
      .parse::<ImageEncoding>()
      .inspect_err(|e| error!("输入图像编码无效: {}", e))?;
    let output_image_encoding = self
      .output_image_encoding
      .parse::<ImageEncoding>()
      .inspect_err(|e| error!("输出图像编码无效: {}", e))?;

    let config = AnnotateConfig::builder()
      .object_label_separator(self.object_label_separator)
      .keypoint_labels_str(&self.kpts_labels)
      .build()?;

    info!(
      "使用 `{}` (输入) 与 `{}` (输出) 图像编码",
      self.input_image_encoding, self.output_image_encoding
    );

    Ok(ValidatedSettings {
      input_image_encoding,
      output_image_encoding,
      config,
    })
  }
}
