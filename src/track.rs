// 该文件是 Shanan （山南西风） 项目的一部分。
// src/track.rs - 关键点轨迹解码
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

//! 扁平的关键点数组按 目标 -> 轨迹 -> 关键点 的顺序拼接。
//! 解码时先对计数数组做一次前缀和，之后按区间索引，不复制子数组。

use std::ops::Range;

use crate::{error::ShapeError, record::KeypointTracks};

/// 一条轨迹的关键点视图
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct TrackView<'a> {
  pub x: &'a [f64],
  pub y: &'a [f64],
  pub score: &'a [f64],
  pub label_id: &'a [i64],
}

impl TrackView<'_> {
  pub fn len(&self) -> usize {
    self.x.len()
  }

  pub fn is_empty(&self) -> bool {
    self.x.is_empty()
  }
}

/// 解码后的轨迹索引
#[derive(Debug, Clone)]
pub struct DecodedTracks<'a> {
  source: &'a KeypointTracks,
  /// 每个目标在轨迹表中的区间
  objects: Vec<Range<usize>>,
  /// 每条轨迹在关键点数组中的区间
  tracks: Vec<Range<usize>>,
}

impl<'a> DecodedTracks<'a> {
  pub fn object_count(&self) -> usize {
    self.objects.len()
  }

  pub fn track_count(&self, object: usize) -> usize {
    self.objects.get(object).map_or(0, |range| range.len())
  }

  /// 目标的全部轨迹，按时间顺序
  pub fn tracks(&self, object: usize) -> impl Iterator<Item = TrackView<'a>> + '_ {
    self
      .objects
      .get(object)
      .cloned()
      .unwrap_or_default()
      .map(move |track| self.view(track))
  }

  /// 目标的最后一条轨迹，即最新位置；只有它会被绘制
  pub fn last_track(&self, object: usize) -> Option<TrackView<'a>> {
    let range = self.objects.get(object)?;
    if range.is_empty() {
      return None;
    }
    Some(self.view(range.end - 1))
  }

  fn view(&self, track: usize) -> TrackView<'a> {
    let range = self.tracks[track].clone();
    let source = self.source;
    TrackView {
      x: &source.x[range.clone()],
      y: &source.y[range.clone()],
      score: &source.score[range.clone()],
      label_id: &source.label_id[range],
    }
  }
}

/// 解码 `object_count` 个目标的关键点轨迹
pub fn decode(
  object_count: usize,
  source: &KeypointTracks,
) -> Result<DecodedTracks<'_>, ShapeError> {
  let tracks_per_object: Vec<usize> = match &source.track_count {
    Some(track_count) => {
      if track_count.len() != object_count {
        return Err(ShapeError::TrackCountLength {
          expected: object_count,
          actual: track_count.len(),
        });
      }
      track_count.iter().map(|&n| n as usize).collect()
    }
    None => vec![1; object_count],
  };

  let declared_tracks: usize = tracks_per_object.iter().sum();
  if declared_tracks != source.kpts_count.len() {
    return Err(ShapeError::TrackSumMismatch {
      declared: declared_tracks,
      actual: source.kpts_count.len(),
    });
  }

  let declared_kpts: usize = source.kpts_count.iter().map(|&n| n as usize).sum();
  for (field, len) in [
    ("object_track_kpts_x", source.x.len()),
    ("object_track_kpts_y", source.y.len()),
    ("object_track_kpts_score", source.score.len()),
    ("object_track_kpts_label_id", source.label_id.len()),
  ] {
    if len != declared_kpts {
      return Err(ShapeError::KeypointSumMismatch {
        field,
        declared: declared_kpts,
        actual: len,
      });
    }
  }

  let objects = prefix_ranges(tracks_per_object.into_iter());
  let tracks = prefix_ranges(source.kpts_count.iter().map(|&n| n as usize));

  Ok(DecodedTracks {
    source,
    objects,
    tracks,
  })
}

fn prefix_ranges(counts: impl Iterator<Item = usize>) -> Vec<Range<usize>> {
  let mut cursor = 0;
  counts
    .map(|count| {
      let range = cursor..cursor + count;
      cursor += count;
      range
    })
    .collect()
}

#[cfg(test)]
mod tests {
  use super::*;

  fn nine_keypoints(track_count: Option<Vec<u32>>, kpts_count: Vec<u32>) -> KeypointTracks {
    let x: Vec<f64> = (0..9).map(|i| i as f64).collect();
    KeypointTracks {
      track_count,
      kpts_count,
      y: x.iter().map(|v| v + 100.0).collect(),
      score: vec![0.5; 9],
      label_id: (0..9).collect(),
      x,
    }
  }

  #[test]
  fn decodes_variable_tracks_per_object() {
    let source = nine_keypoints(Some(vec![2, 1]), vec![3, 2, 4]);
    let decoded = decode(2, &source).unwrap();

    assert_eq!(decoded.object_count(), 2);
    let sizes: Vec<Vec<usize>> = (0..2)
      .map(|o| decoded.tracks(o).map(|t| t.len()).collect())
      .collect();
    assert_eq!(sizes, vec![vec![3, 2], vec![4]]);

    let first: Vec<TrackView> = decoded.tracks(0).collect();
    assert_eq!(first[0].x, &[0.0, 1.0, 2.0]);
    assert_eq!(first[1].x, &[3.0, 4.0]);
    assert_eq!(first[1].y, &[103.0, 104.0]);
    assert_eq!(decoded.tracks(1).next().unwrap().label_id, &[5, 6, 7, 8]);
  }

  #[test]
  fn last_track_is_the_most_recent_one() {
    let source = nine_keypoints(Some(vec![2, 1]), vec![3, 2, 4]);
    let decoded = decode(2, &source).unwrap();
    assert_eq!(decoded.last_track(0).unwrap().x, &[3.0, 4.0]);
    assert_eq!(decoded.last_track(1).unwrap().x, &[5.0, 6.0, 7.0, 8.0]);
    assert!(decoded.last_track(2).is_none());
  }

  #[test]
  fn missing_track_count_means_one_track_per_object() {
    let source = nine_keypoints(None, vec![4, 5]);
    let decoded = decode(2, &source).unwrap();
    assert_eq!(decoded.track_count(0), 1);
    assert_eq!(decoded.track_count(1), 1);
    assert_eq!(decoded.last_track(1).unwrap().len(), 5);
  }

  #[test]
  fn object_with_zero_tracks_consumes_nothing() {
    let source = nine_keypoints(Some(vec![0, 2, 0]), vec![4, 5]);
    let decoded = decode(3, &source).unwrap();
    assert_eq!(decoded.track_count(0), 0);
    assert!(decoded.last_track(0).is_none());
    assert_eq!(decoded.tracks(0).count(), 0);
    assert_eq!(decoded.last_track(1).unwrap().x[0], 4.0);
    assert!(decoded.last_track(2).is_none());
  }

  #[test]
  fn empty_track_is_decoded_as_empty_view() {
    let source = nine_keypoints(Some(vec![2]), vec![9, 0]);
    let decoded = decode(1, &source).unwrap();
    assert!(decoded.last_track(0).unwrap().is_empty());
  }

  #[test]
  fn count_invariants_are_enforced() {
    let source = nine_keypoints(Some(vec![2, 1]), vec![3, 2]);
    assert_eq!(
      decode(2, &source).unwrap_err(),
      ShapeError::TrackSumMismatch {
        declared: 3,
        actual: 2
      }
    );

    let source = nine_keypoints(Some(vec![2, 1]), vec![3, 2, 3]);
    assert!(matches!(
      decode(2, &source).unwrap_err(),
      ShapeError::KeypointSumMismatch {
        declared: 8,
        actual: 9,
        ..
      }
    ));

    let source = nine_keypoints(Some(vec![3]), vec![3, 2, 4]);
    assert_eq!(
      decode(2, &source).unwrap_err(),
      ShapeError::TrackCountLength {
        expected: 2,
        actual: 1
      }
    );

    let mut source = nine_keypoints(None, vec![4, 5]);
    source.label_id.pop();
    assert!(matches!(
      decode(2, &source).unwrap_err(),
      ShapeError::KeypointSumMismatch {
        field: "object_track_kpts_label_id",
        ..
      }
    ));
  }
}
