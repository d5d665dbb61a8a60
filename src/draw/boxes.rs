// 该文件是 Shanan （山南西风） 项目的一部分。
// src/draw/boxes.rs - 目标框与标签绘制
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
use imageproc::drawing::{draw_filled_rect_mut, draw_hollow_rect_mut, draw_text_mut};
use imageproc::rect::Rect;

use crate::{
  color::{DEFAULT_BOX_COLOR, color_for, text_color_for},
  config::AnnotateConfig,
  draw::{Draw, clamp_span},
  error::AnnotateError,
  record::DetectionRecord,
};

/// 单个目标框的绘制指令
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct BoxInstruction {
  /// 左上角，像素坐标向零截断
  pub top_left: (i32, i32),
  /// 右下角，包含在框内
  pub bottom_right: (i32, i32),
  pub text: String,
  pub color: Rgb<u8>,
}

/// 组合目标框标签，例如 `#1 person (91%) > running`
pub fn box_text(
  object_id: Option<i64>,
  label: &str,
  score: f64,
  attribute: Option<&str>,
) -> String {
  let mut text = String::new();
  if let Some(id) = object_id {
    text.push_str(&format!("#{} ", id));
  }
  text.push_str(&format!("{} ({:.0}%)", label, score * 100.0));
  if let Some(attribute) = attribute {
    text.push_str(&format!(" > {}", attribute));
  }
  text
}

/// 校验记录并生成全部目标框的绘制指令
pub fn plan_boxes(
  record: &DetectionRecord,
  config: &AnnotateConfig,
) -> Result<Vec<BoxInstruction>, AnnotateError> {
  let separator = config.object_label_separator();
  record.validate(separator)?;
  if record.is_empty() {
    return Ok(Vec::new());
  }

  let labels = record.labels(separator);
  let attributes = record.attributes(separator);
  let object_ids = record.object_id.as_deref();

  let items = (0..record.object_count())
    .map(|i| {
      let (x, y, w, h) = (record.x[i], record.y[i], record.w[i], record.h[i]);
      let object_id = object_ids.map(|ids| ids[i]);
      let color = match object_id {
        Some(id) => color_for(id.saturating_sub(1)),
        None => DEFAULT_BOX_COLOR,
      };
      BoxInstruction {
        top_left: (x as i32, y as i32),
        bottom_right: ((x + w) as i32, (y + h) as i32),
        text: box_text(
          object_id,
          labels[i],
          record.score[i],
          attributes.as_ref().map(|attributes| attributes[i]),
        ),
        color,
      }
    })
    .collect();

  Ok(items)
}

impl Draw {
  /// 在图像上绘制全部目标框，返回同一图像
  pub fn render_boxes<'i>(
    &self,
    image: &'i mut RgbImage,
    record: &DetectionRecord,
    config: &AnnotateConfig,
  ) -> Result<&'i mut RgbImage, AnnotateError> {
    for item in plan_boxes(record, config)? {
      self.draw_box(image, &item);
    }
    Ok(image)
  }

  /// 绘制 1 像素边框，并在框上方绘制填充的标签条
  pub fn draw_box(&self, image: &mut RgbImage, item: &BoxInstruction) {
    let (width, height) = image.dimensions();
    let (x0, y0) = item.top_left;
    let (x1, y1) = item.bottom_right;

    // 边框各边限制在画布外一像素以内
    let left = clamp_span(x0.min(x1), 0, width);
    let right = clamp_span(x0.max(x1), 0, width);
    let top = clamp_span(y0.min(y1), 0, height);
    let bottom = clamp_span(y0.max(y1), 0, height);
    let rect =
      Rect::at(left, top).of_size(right.abs_diff(left) + 1, bottom.abs_diff(top) + 1);
    draw_hollow_rect_mut(image, rect, item.color);

    let text_color = text_color_for(item.color);
    let (text_width, line_height) = self.measure_text(self.box_label_scale, &item.text);
    let strip_width = text_width + 2 * self.label_margin;
    let strip_height = line_height + 2 * self.label_margin;

    // 标签条紧贴在框的上边缘之上
    let strip_x = clamp_span(x0, strip_width, width);
    let strip_y = clamp_span(y0.saturating_sub(strip_height as i32), strip_height, height);
    let strip = Rect::at(strip_x, strip_y).of_size(strip_width, strip_height);
    draw_filled_rect_mut(image, strip, item.color);

    let margin = self.label_margin as i32;
    draw_text_mut(
      image,
      text_color,
      strip_x + margin,
      strip_y + margin,
      self.box_label_scale,
      &self.font,
      &item.text,
    );
  }
}

#[cfg(test)]
mod tests {
  use super::*;

  fn config() -> AnnotateConfig {
    AnnotateConfig::builder().build().unwrap()
  }

  #[test]
  fn text_is_composed_from_optional_parts() {
    assert_eq!(box_text(None, "person", 0.91, None), "person (91%)");
    assert_eq!(box_text(Some(3), "ball", 0.754, None), "#3 ball (75%)");
    assert_eq!(
      box_text(Some(1), "person", 0.5, Some("running")),
      "#1 person (50%) > running"
    );
  }

  #[test]
  fn corners_are_truncated_toward_zero() {
    let record = DetectionRecord::new(
      "car",
      vec![10.9],
      vec![-2.7],
      vec![5.5],
      vec![4.1],
      vec![0.5],
    );
    let items = plan_boxes(&record, &config()).unwrap();
    assert_eq!(items[0].top_left, (10, -2));
    assert_eq!(items[0].bottom_right, (16, 1));
    assert_eq!(items[0].color, DEFAULT_BOX_COLOR);
  }

  #[test]
  fn identity_picks_palette_color() {
    let record = DetectionRecord::new(
      "a|b",
      vec![0.0, 0.0],
      vec![0.0, 0.0],
      vec![1.0, 1.0],
      vec![1.0, 1.0],
      vec![0.1, 0.2],
    )
    .with_object_ids(vec![1, 12])
    .with_attribute("x|y");
    let config = AnnotateConfig::builder()
      .object_label_separator("|")
      .build()
      .unwrap();
    let items = plan_boxes(&record, &config).unwrap();
    assert_eq!(items[0].color, color_for(0));
    assert_eq!(items[1].color, color_for(1));
    assert_eq!(items[1].text, "#12 b (20%) > y");
  }

  #[test]
  fn no_objects_leaves_image_unchanged() {
    let mut image = RgbImage::from_pixel(16, 16, Rgb([9, 9, 9]));
    let expected = image.clone();
    Draw::default()
      .render_boxes(&mut image, &DetectionRecord::default(), &config())
      .unwrap();
    assert_eq!(image, expected);
  }

  #[test]
  fn label_strip_uses_contrasting_text() {
    let draw = Draw::default();
    let cases = [(Rgb([0, 0, 0]), true), (Rgb([255, 255, 255]), false)];
    for (background, text_is_bright) in cases {
      let inverse = Rgb([255 - background[0], 255 - background[1], 255 - background[2]]);
      let mut image = RgbImage::from_pixel(200, 100, inverse);
      let item = BoxInstruction {
        top_left: (10, 60),
        bottom_right: (150, 90),
        text: "#7 person (99%)".to_string(),
        color: background,
      };
      draw.draw_box(&mut image, &item);

      // 标签条左下角只有背景色
      assert_eq!(*image.get_pixel(10, 59), background);
      // 标签条的文字区域内存在文字像素
      let (text_width, line_height) = draw.measure_text(draw.box_label_scale, &item.text);
      let has_text = (58 - line_height..58).any(|y| {
        (12..12 + text_width).any(|x| {
          let Rgb([r, _, _]) = *image.get_pixel(x, y);
          if text_is_bright { r > 128 } else { r < 128 }
        })
      });
      assert!(has_text);
    }
  }

  #[test]
  fn boxes_outside_canvas_are_clipped() {
    let mut image = RgbImage::new(20, 20);
    let record = DetectionRecord::new(
      "a,b,c",
      vec![-50.0, 15.0, 1.0e12],
      vec![-50.0, 15.0, -1.0e12],
      vec![60.0, 30.0, 1.0e12],
      vec![60.0, 30.0, 1.0e12],
      vec![0.5, 0.5, 0.5],
    );
    Draw::default()
      .render_boxes(&mut image, &record, &config())
      .unwrap();
    assert_eq!(image.dimensions(), (20, 20));
    // 第一个框的右下角在画布内
    assert_eq!(*image.get_pixel(10, 10), DEFAULT_BOX_COLOR);
  }
}
