// 该文件是 Shanan （山南西风） 项目的一部分。
// src/draw.rs - 标注绘制
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

use ab_glyph::{Font, FontArc, PxScale, ScaleFont};
use imageproc::drawing::text_size;

mod boxes;
mod keypoints;

pub use self::boxes::{BoxInstruction, box_text, plan_boxes};
pub use self::keypoints::{KeypointInstruction, plan_keypoints};

// 文本渲染常量
const BOX_LABEL_FONT_SIZE: f32 = 12.0;
const KEYPOINT_LABEL_FONT_SIZE: f32 = 14.0;
const LABEL_MARGIN: u32 = 2;
const KEYPOINT_RADIUS: i32 = 3;

/// 绘制工具，持有字体与绘制参数，可在线程间共享
#[derive(Clone)]
pub struct Draw {
  font: FontArc,
  box_label_scale: PxScale,
  keypoint_label_scale: PxScale,
  label_margin: u32,
  keypoint_radius: i32,
}

impl Default for Draw {
  fn default() -> Self {
    let font_data = include_bytes!("../assets/DejaVuSans.ttf"); // 默认字体
    let font = FontArc::try_from_slice(font_data).expect("无法加载嵌入的字体文件");
    Self::with_font(font)
  }
}

impl std::fmt::Debug for Draw {
  fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
    f.debug_struct("Draw")
      .field("box_label_scale", &self.box_label_scale)
      .field("keypoint_label_scale", &self.keypoint_label_scale)
      .field("label_margin", &self.label_margin)
      .field("keypoint_radius", &self.keypoint_radius)
      .finish_non_exhaustive()
  }
}

impl Draw {
  pub fn with_font(font: FontArc) -> Self {
    Self {
      font,
      box_label_scale: PxScale::from(BOX_LABEL_FONT_SIZE),
      keypoint_label_scale: PxScale::from(KEYPOINT_LABEL_FONT_SIZE),
      label_margin: LABEL_MARGIN,
      keypoint_radius: KEYPOINT_RADIUS,
    }
  }

  pub fn box_label_size(mut self, size: f32) -> Self {
    self.box_label_scale = PxScale::from(size);
    self
  }

  pub fn keypoint_label_size(mut self, size: f32) -> Self {
    self.keypoint_label_scale = PxScale::from(size);
    self
  }

  /// 文本宽度与行高（上升高度加下降高度）
  fn measure_text(&self, scale: PxScale, text: &str) -> (u32, u32) {
    let (width, _) = text_size(scale, &self.font, text);
    (width, self.line_height(scale))
  }

  fn line_height(&self, scale: PxScale) -> u32 {
    let scaled = self.font.as_scaled(scale);
    (scaled.ascent() - scaled.descent()).ceil() as u32
  }

  fn ascent(&self, scale: PxScale) -> i32 {
    self.font.as_scaled(scale).ascent().ceil() as i32
  }
}

/// 将跨度为 `[start, start + len]` 的图元起点限制在画布附近，
/// 完全位于画布外的图元仍然位于画布外
fn clamp_span(start: i32, len: u32, extent: u32) -> i32 {
  let len = len.min(i32::MAX as u32 - 1) as i32;
  let extent = extent.min(i32::MAX as u32) as i32;
  start.clamp(-len - 1, extent)
}
