// 该文件是 Shanan （山南西风） 项目的一部分。
// src/annotate.rs - 单帧标注入口
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

use image::RgbImage;
use tracing::debug;

use crate::{
  config::AnnotateConfig,
  draw::{Draw, plan_boxes, plan_keypoints},
  error::AnnotateError,
  record::DetectionRecord,
  track,
};

/// 单帧标注器。
///
/// 标注器本身不可变，可以在多个线程间共享；每次调用使用调用方独占的图像与记录。
/// 调用失败时图像保持原样，调用方负责记录失败并继续处理下一帧。
#[derive(Debug, Clone)]
pub struct Annotator {
  config: AnnotateConfig,
  draw: Draw,
}

impl Annotator {
  pub fn new(config: AnnotateConfig) -> Self {
    Self::with_draw(config, Draw::default())
  }

  pub fn with_draw(config: AnnotateConfig, draw: Draw) -> Self {
    Self { config, draw }
  }

  pub fn config(&self) -> &AnnotateConfig {
    &self.config
  }

  /// 先绘制目标框，再在存在关键点数据时绘制关键点，返回同一图像。
  ///
  /// 所有校验与标签解析都在写入像素之前完成。
  pub fn annotate<'i>(
    &self,
    image: &'i mut RgbImage,
    record: &DetectionRecord,
  ) -> Result<&'i mut RgbImage, AnnotateError> {
    let boxes = plan_boxes(record, &self.config)?;

    // 目标数组为空时即使带有关键点字段也跳过
    let keypoints = match &record.keypoints {
      Some(source) if !record.is_empty() => {
        let tracks = track::decode(record.object_count(), source)?;
        plan_keypoints(&tracks, record.object_id.as_deref(), &self.config)?
      }
      _ => Vec::new(),
    };

    debug!(
      "标注 {} 个目标, {} 个关键点",
      boxes.len(),
      keypoints.len()
    );

    for item in &boxes {
      self.draw.draw_box(image, item);
    }
    for item in &keypoints {
      self.draw.draw_keypoint(image, item);
    }

    Ok(image)
  }
}
