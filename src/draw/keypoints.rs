// 该文件是 Shanan （山南西风） 项目的一部分。
// src/draw/keypoints.rs - 关键点绘制
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

use image::{Rgb, RgbImage};
use imageproc::drawing::{draw_filled_circle_mut, draw_text_mut};
use tracing::error;

use crate::{
  color::color_for,
  config::AnnotateConfig,
  draw::{Draw, clamp_span},
  error::AnnotateError,
  track::DecodedTracks,
};

const KEYPOINT_TEXT_COLOR: Rgb<u8> = Rgb([255, 255, 255]);

/// 单个关键点的绘制指令
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct KeypointInstruction {
  pub center: (i32, i32),
  pub label: String,
  pub color: Rgb<u8>,
}

/// 为每个目标的最后一条轨迹生成关键点绘制指令，较早的轨迹不绘制。
/// 标签编号越界时整帧失败，不会输出错误的标签。
pub fn plan_keypoints(
  tracks: &DecodedTracks<'_>,
  object_ids: Option<&[i64]>,
  config: &AnnotateConfig,
) -> Result<Vec<KeypointInstruction>, AnnotateError> {
  let mut items = Vec::new();

  for object in 0..tracks.object_count() {
    let Some(track) = tracks.last_track(object) else {
      continue;
    };

    let identity = object_ids
      .and_then(|ids| ids.get(object))
      .copied()
      .unwrap_or(1);
    let color = color_for(identity.saturating_sub(1));

    for k in 0..track.len() {
      let label_id = track.label_id[k];
      let label = config.keypoint_label(label_id).ok_or_else(|| {
        error!(
          "关键点标签编号 {} 超出范围 (共 {} 个标签)",
          label_id,
          config.keypoint_labels().len()
        );
        AnnotateError::KeypointLabelOutOfRange {
          label_id,
          available: config.keypoint_labels().len(),
        }
      })?;

      items.push(KeypointInstruction {
        center: (track.x[k].round() as i32, track.y[k].round() as i32),
        label: label.to_string(),
        color,
      });
    }
  }

  Ok(items)
}

impl Draw {
  /// 在图像上绘制每个目标最新的关键点，返回同一图像
  pub fn render_keypoints<'i>(
    &self,
    image: &'i mut RgbImage,
    tracks: &DecodedTracks<'_>,
    object_ids: Option<&[i64]>,
    config: &AnnotateConfig,
  ) -> Result<&'i mut RgbImage, AnnotateError> {
    for item in plan_keypoints(tracks, object_ids, config)? {
      self.draw_keypoint(image, &item);
    }
    Ok(image)
  }

  /// 绘制实心圆点，并以该点为基线起点绘制白色标签
  pub fn draw_keypoint(&self, image: &mut RgbImage, item: &KeypointInstruction) {
    let (width, height) = image.dimensions();
    let (x, y) = item.center;
    let radius = self.keypoint_radius;
    let diameter = 2 * radius as u32;

    let cx = clamp_span(x.saturating_sub(radius), diameter, width) + radius;
    let cy = clamp_span(y.saturating_sub(radius), diameter, height) + radius;
    draw_filled_circle_mut(image, (cx, cy), radius, item.color);

    let scale = self.keypoint_label_scale;
    let (text_width, line_height) = self.measure_text(scale, &item.label);
    let text_x = clamp_span(x, text_width, width);
    let text_y = clamp_span(y.saturating_sub(self.ascent(scale)), line_height, height);
    draw_text_mut(
      image,
      KEYPOINT_TEXT_COLOR,
      text_x,
      text_y,
      scale,
      &self.font,
      &item.label,
    );
  }
}

#[cfg(test)]
mod tests {
  use super::*;
  use crate::{record::KeypointTracks, track};

  fn config() -> AnnotateConfig {
    AnnotateConfig::builder()
      .keypoint_labels_str("nose,l_eye,r_eye")
      .build()
      .unwrap()
  }

  fn two_tracks() -> KeypointTracks {
    KeypointTracks {
      track_count: Some(vec![2]),
      kpts_count: vec![2, 2],
      x: vec![5.0, 6.0, 40.4, 60.6],
      y: vec![5.0, 6.0, 30.5, 70.2],
      score: vec![0.9; 4],
      label_id: vec![0, 1, 1, 2],
    }
  }

  #[test]
  fn only_last_track_is_planned() {
    let source = two_tracks();
    let decoded = track::decode(1, &source).unwrap();
    let items = plan_keypoints(&decoded, Some([3].as_slice()), &config()).unwrap();

    assert_eq!(items.len(), 2);
    assert_eq!(items[0].center, (40, 31));
    assert_eq!(items[0].label, "l_eye");
    assert_eq!(items[1].center, (61, 70));
    assert_eq!(items[1].label, "r_eye");
    assert!(items.iter().all(|item| item.color == color_for(2)));
  }

  #[test]
  fn missing_identity_uses_first_palette_color() {
    let source = two_tracks();
    let decoded = track::decode(1, &source).unwrap();
    let items = plan_keypoints(&decoded, None, &config()).unwrap();
    assert!(items.iter().all(|item| item.color == color_for(0)));
  }

  #[test]
  fn out_of_range_label_fails_loudly() {
    let mut source = two_tracks();
    source.label_id[3] = 3;
    let decoded = track::decode(1, &source).unwrap();
    assert_eq!(
      plan_keypoints(&decoded, None, &config()).unwrap_err(),
      AnnotateError::KeypointLabelOutOfRange {
        label_id: 3,
        available: 3
      }
    );

    source.label_id[3] = -1;
    let decoded = track::decode(1, &source).unwrap();
    assert!(plan_keypoints(&decoded, None, &config()).is_err());
  }

  #[test]
  fn out_of_range_label_in_earlier_track_is_not_resolved() {
    let mut source = two_tracks();
    source.label_id[0] = 99;
    let decoded = track::decode(1, &source).unwrap();
    assert!(plan_keypoints(&decoded, None, &config()).is_ok());
  }

  #[test]
  fn earlier_track_is_not_drawn() {
    let source = two_tracks();
    let decoded = track::decode(1, &source).unwrap();
    let mut image = RgbImage::new(100, 100);
    Draw::default()
      .render_keypoints(&mut image, &decoded, Some([1].as_slice()), &config())
      .unwrap();

    let color = color_for(0);
    // 圆点位于标签起点的左下方，不与文字重叠
    assert_eq!(*image.get_pixel(39, 32), color);
    assert_eq!(*image.get_pixel(60, 71), color);
    // 第一条轨迹的位置保持不变
    assert_eq!(*image.get_pixel(5, 5), Rgb([0, 0, 0]));
    assert_eq!(*image.get_pixel(6, 6), Rgb([0, 0, 0]));
  }
}
