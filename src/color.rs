// 该文件是 Shanan （山南西风） 项目的一部分。
// src/color.rs - 标注颜色分配
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

use image::Rgb;

/// 调色板（RGB），按目标编号循环取色
pub const PALETTE: [Rgb<u8>; 10] = [
  Rgb([7, 102, 209]),   // 蓝
  Rgb([217, 163, 11]),  // 深黄
  Rgb([204, 45, 45]),   // 深红
  Rgb([6, 193, 204]),   // 青
  Rgb([41, 184, 105]),  // 深绿
  Rgb([219, 18, 125]),  // 粉
  Rgb([0, 0, 0]),       // 黑
  Rgb([126, 136, 154]), // 石板灰
  Rgb([255, 255, 255]), // 白
  Rgb([3, 41, 84]),     // 午夜蓝
];

/// 没有目标编号时使用的边框颜色
pub const DEFAULT_BOX_COLOR: Rgb<u8> = Rgb([5, 74, 153]);

/// 背景亮度低于该阈值时使用白色文字
pub const TEXT_BRIGHTNESS_THRESHOLD: f32 = 150.0;

const WHITE: Rgb<u8> = Rgb([255, 255, 255]);
const BLACK: Rgb<u8> = Rgb([0, 0, 0]);

/// 根据身份编号取颜色，负数按非负取模处理
pub fn color_for(identity: i64) -> Rgb<u8> {
  PALETTE[identity.rem_euclid(PALETTE.len() as i64) as usize]
}

/// 根据背景颜色选择对比度合适的文字颜色
pub fn text_color_for(background: Rgb<u8>) -> Rgb<u8> {
  let Rgb([r, g, b]) = background;
  let mean = (r as f32 + g as f32 + b as f32) / 3.0;
  if mean < TEXT_BRIGHTNESS_THRESHOLD {
    WHITE
  } else {
    BLACK
  }
}

#[cfg(test)]
mod tests {
  use super::*;

  #[test]
  fn color_is_stable_and_wraps_around_palette() {
    for k in -25..25 {
      assert_eq!(color_for(k), color_for(k));
      assert_eq!(color_for(k), color_for(k + 10));
    }
    assert_eq!(color_for(0), Rgb([7, 102, 209]));
    assert_eq!(color_for(9), Rgb([3, 41, 84]));
  }

  #[test]
  fn negative_identity_is_normalized() {
    assert_eq!(color_for(-1), PALETTE[9]);
    assert_eq!(color_for(-10), PALETTE[0]);
    assert_eq!(color_for(i64::MIN), PALETTE[i64::MIN.rem_euclid(10) as usize]);
  }

  #[test]
  fn text_contrast_follows_background_brightness() {
    assert_eq!(text_color_for(Rgb([0, 0, 0])), WHITE);
    assert_eq!(text_color_for(Rgb([255, 255, 255])), BLACK);
    assert_eq!(text_color_for(DEFAULT_BOX_COLOR), WHITE);
    // 均值恰好为 150 时使用黑色
    assert_eq!(text_color_for(Rgb([150, 150, 150])), BLACK);
    assert_eq!(text_color_for(Rgb([149, 150, 150])), WHITE);
  }
}
