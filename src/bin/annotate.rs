// 该文件是 Shanan （山南西风） 项目的一部分。
// src/bin/annotate.rs - 帧清单标注程序
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

use std::path::PathBuf;

use anyhow::{Context, Result};
use clap::Parser;
use tracing::{error, info, warn};
use url::Url;

use shanan_annotate::{
  Annotator, FromUrl,
  config::AnnotateSettings,
  input::FrameManifestInput,
  output::SaveAnnotatedImageOutput,
};

/// 检测结果标注程序参数
#[derive(Parser, Debug)]
#[command(author, version, about, long_about = None)]
pub struct Args {
  /// 帧清单，例如 frames:///data/frames.jsonl
  #[arg(long, value_name = "SOURCE")]
  pub input: Url,
  /// 输出目录，例如 folder:///data/annotated
  #[arg(long, value_name = "OUTPUT")]
  pub output: Url,
  /// JSON 格式的初始化设置文件
  #[arg(long, value_name = "FILE")]
  pub settings: Option<PathBuf>,
  /// 覆盖设置中的目标标签分隔符
  #[arg(long, value_name = "SEPARATOR")]
  pub separator: Option<String>,
  /// 覆盖设置中的关键点标签（逗号分隔）
  #[arg(long, value_name = "LABELS")]
  pub kpts_labels: Option<String>,
}

fn main() -> Result<()> {
  tracing_subscriber::fmt::init();

  let args = Args::parse();

  info!("输入来源: {}", args.input);
  info!("输出路径: {}", args.output);

  let mut settings = match &args.settings {
    Some(path) => {
      let text = std::fs::read_to_string(path)
        .with_context(|| format!("无法读取设置文件 {}", path.display()))?;
      AnnotateSettings::from_json_str(&text)
        .with_context(|| format!("无法解析设置文件 {}", path.display()))?
    }
    None => AnnotateSettings::default(),
  };
  if let Some(separator) = args.separator {
    settings.object_label_separator = separator;
  }
  if let Some(kpts_labels) = args.kpts_labels {
    settings.kpts_labels = kpts_labels;
  }
  let settings = settings.validate()?;

  let annotator = Annotator::new(settings.config);
  let input = FrameManifestInput::from_url(&args.input)?;
  let output = SaveAnnotatedImageOutput::from_url(&args.output)?
    .with_encoding(settings.output_image_encoding);

  info!("开始标注...");
  let now = std::time::Instant::now();
  let (mut done, mut failed) = (0usize, 0usize);
  for frame in input {
    // 单帧失败只记录，不影响后续帧
    let mut frame = match frame {
      Ok(frame) => frame,
      Err(e) => {
        error!("读取帧失败: {}", e);
        failed += 1;
        continue;
      }
    };

    if let Err(e) = annotator.annotate(&mut frame.image, &frame.record) {
      error!("第 {} 帧标注失败: {}", frame.index, e);
      failed += 1;
      continue;
    }

    match output.save(frame.index, &frame.image) {
      Ok(_) => done += 1,
      Err(e) => {
        error!("第 {} 帧保存失败: {}", frame.index, e);
        failed += 1;
      }
    }
  }

  info!("标注完成，耗时: {:.2?}", now.elapsed());
  info!("成功帧数: {}", done);
  if failed > 0 {
    warn!("失败帧数: {}", failed);
  }

  Ok(())
}
