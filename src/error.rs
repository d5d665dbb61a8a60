// 该文件是 Shanan （山南西风） 项目的一部分。
// src/error.rs - 标注错误定义
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

use thiserror::Error;

/// 配置错误，在构建配置时报告
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum ConfigError {
  #[error("目标标签分隔符未设置")]
  EmptySeparator,
  #[error("不支持的图像编码 `{0}`，必须是 wide、jpg 或 png 之一")]
  UnsupportedEncoding(String),
}

/// 检测记录的形状错误，上游记录格式不正确
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum ShapeError {
  #[error("字段 `{field}` 长度不匹配: 期望 {expected}, 实际 {actual}")]
  LengthMismatch {
    field: &'static str,
    expected: usize,
    actual: usize,
  },
  #[error("字段 `{field}` 分隔后的标记数不匹配: 期望 {expected}, 实际 {actual}")]
  TokenCountMismatch {
    field: &'static str,
    expected: usize,
    actual: usize,
  },
  #[error("每个目标的轨迹数数组长度为 {actual}, 目标数为 {expected}")]
  TrackCountLength { expected: usize, actual: usize },
  #[error("轨迹总数 {declared} 与轨迹关键点计数数组长度 {actual} 不一致")]
  TrackSumMismatch { declared: usize, actual: usize },
  #[error("关键点总数 {declared} 与关键点数组 `{field}` 长度 {actual} 不一致")]
  KeypointSumMismatch {
    field: &'static str,
    declared: usize,
    actual: usize,
  },
  #[error("存在关键点坐标但缺少字段 `{0}`")]
  MissingKeypointField(&'static str),
}

/// 单帧标注错误
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum AnnotateError {
  #[error("配置错误: {0}")]
  Config(#[from] ConfigError),
  #[error("记录形状错误: {0}")]
  Shape(#[from] ShapeError),
  #[error("关键点标签编号 {label_id} 超出范围, 共配置 {available} 个关键点标签")]
  KeypointLabelOutOfRange { label_id: i64, available: usize },
}
