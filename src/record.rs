// 该文件是 Shanan （山南西风） 项目的一部分。
// src/record.rs - 单帧检测记录
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

use crate::error::ShapeError;

/// 关键点轨迹的扁平数组，按 目标 -> 轨迹 -> 关键点 顺序拼接
#[derive(Debug, Clone, Default, PartialEq)]
pub struct KeypointTracks {
  /// 每个目标的轨迹数，缺省时每个目标一条轨迹
  pub track_count: Option<Vec<u32>>,
  /// 每条轨迹的关键点数
  pub kpts_count: Vec<u32>,
  pub x: Vec<f64>,
  pub y: Vec<f64>,
  /// 关键点置信度，绘制时不使用
  pub score: Vec<f64>,
  /// 关键点标签编号，对应配置中的关键点标签表
  pub label_id: Vec<i64>,
}

/// 单帧检测结果，各数组按目标下标对齐
#[derive(Debug, Clone, Default, PartialEq, Deserialize)]
#[serde(try_from = "DetectionRecordWire")]
pub struct DetectionRecord {
  /// 以分隔符连接的类别名
  pub label: String,
  pub x: Vec<f64>,
  pub y: Vec<f64>,
  pub w: Vec<f64>,
  pub h: Vec<f64>,
  pub score: Vec<f64>,
  pub object_id: Option<Vec<i64>>,
  /// 以分隔符连接的属性
  pub attribute: Option<String>,
  pub keypoints: Option<KeypointTracks>,
}

impl DetectionRecord {
  pub fn new(
    label: impl Into<String>,
    x: Vec<f64>,
    y: Vec<f64>,
    w: Vec<f64>,
    h: Vec<f64>,
    score: Vec<f64>,
  ) -> Self {
    Self {
      label: label.into(),
      x,
      y,
      w,
      h,
      score,
      ..Default::default()
    }
  }

  pub fn with_object_ids(mut self, object_id: Vec<i64>) -> Self {
    self.object_id = Some(object_id);
    self
  }

  pub fn with_attribute(mut self, attribute: impl Into<String>) -> Self {
    self.attribute = Some(attribute.into());
    self
  }

  pub fn with_keypoints(mut self, keypoints: KeypointTracks) -> Self {
    self.keypoints = Some(keypoints);
    self
  }

  pub fn object_count(&self) -> usize {
    self.x.len()
  }

  pub fn is_empty(&self) -> bool {
    self.x.is_empty()
  }

  pub fn labels<'a>(&'a self, separator: &str) -> Vec<&'a str> {
    self.label.split(separator).collect()
  }

  pub fn attributes<'a>(&'a self, separator: &str) -> Option<Vec<&'a str>> {
    self
      .attribute
      .as_deref()
      .map(|attribute| attribute.split(separator).collect())
  }

  /// 校验目标数组的形状，关键点数组由轨迹解码时校验
  pub fn validate(&self, separator: &str) -> Result<(), ShapeError> {
    let n = self.object_count();

    for (field, len) in [
      ("y", self.y.len()),
      ("w", self.w.len()),
      ("h", self.h.len()),
      ("score", self.score.len()),
    ] {
      check_len(field, n, len)?;
    }

    if let Some(object_id) = &self.object_id {
      check_len("object_id", n, object_id.len())?;
    }

    // 没有目标时标签字段可以是空串
    if n == 0 {
      return Ok(());
    }

    let labels = self.labels(separator).len();
    if labels != n {
      return Err(ShapeError::TokenCountMismatch {
        field: "label",
        expected: n,
        actual: labels,
      });
    }

    if let Some(attributes) = self.attributes(separator)
      && attributes.len() != n
    {
      return Err(ShapeError::TokenCountMismatch {
        field: "attribute",
        expected: n,
        actual: attributes.len(),
      });
    }

    Ok(())
  }
}

fn check_len(field: &'static str, expected: usize, actual: usize) -> Result<(), ShapeError> {
  if expected != actual {
    return Err(ShapeError::LengthMismatch {
      field,
      expected,
      actual,
    });
  }
  Ok(())
}

/// 流数据中的记录格式
#[derive(Debug, Default, Deserialize)]
#[serde(default)]
struct DetectionRecordWire {
  label: Option<String>,
  x: Option<Vec<f64>>,
  y: Option<Vec<f64>>,
  w: Option<Vec<f64>>,
  h: Option<Vec<f64>>,
  score: Option<Vec<f64>>,
  object_id: Option<Vec<i64>>,
  attribute: Option<String>,
  object_track_count: Option<Vec<u32>>,
  object_track_kpts_count: Option<Vec<u32>>,
  object_track_kpts_x: Option<Vec<f64>>,
  object_track_kpts_y: Option<Vec<f64>>,
  object_track_kpts_score: Option<Vec<f64>>,
  object_track_kpts_label_id: Option<Vec<i64>>,
}

impl TryFrom<DetectionRecordWire> for DetectionRecord {
  type Error = ShapeError;

  fn try_from(wire: DetectionRecordWire) -> Result<Self, Self::Error> {
    // 以关键点 x 坐标是否存在作为关键点数据存在的依据
    let keypoints = match wire.object_track_kpts_x {
      Some(x) => Some(KeypointTracks {
        track_count: wire.object_track_count,
        kpts_count: wire
          .object_track_kpts_count
          .ok_or(ShapeError::MissingKeypointField("object_track_kpts_count"))?,
        x,
        y: wire
          .object_track_kpts_y
          .ok_or(ShapeError::MissingKeypointField("object_track_kpts_y"))?,
        score: wire
          .object_track_kpts_score
          .ok_or(ShapeError::MissingKeypointField("object_track_kpts_score"))?,
        label_id: wire
          .object_track_kpts_label_id
          .ok_or(ShapeError::MissingKeypointField("object_track_kpts_label_id"))?,
      }),
      None => None,
    };

    Ok(DetectionRecord {
      label: wire.label.unwrap_or_default(),
      x: wire.x.unwrap_or_default(),
      y: wire.y.unwrap_or_default(),
      w: wire.w.unwrap_or_default(),
      h: wire.h.unwrap_or_default(),
      score: wire.score.unwrap_or_default(),
      object_id: wire.object_id,
      attribute: wire.attribute,
      keypoints,
    })
  }
}
