use std::path::PathBuf;

use anyhow::Context;
use clap::Parser;
use timeline_core::{read_rows, render_static, RenderMode, TimelineConfig};
use timeline_rows::rows_from_str;

#[derive(Parser, Debug)]
#[command(
    name = "timeline-cli",
    about = "Dựng markup panel timeline từ file JSON các hàng nội dung."
)]
struct Args {
    /// Đường dẫn tới file JSON chứa các hàng.
    #[arg(short, long)]
    input: PathBuf,

    /// Dựng markup tĩnh cho chế độ soạn thảo (không lớp phủ, không gợi ý tải).
    #[arg(long)]
    preview: bool,

    /// In danh sách mục đã đọc dưới dạng JSON thay vì markup.
    #[arg(long)]
    items: bool,
}

fn main() -> anyhow::Result<()> {
    let args = Args::parse();
    let data = std::fs::read_to_string(&args.input)
        .with_context(|| format!("Không đọc được file {:?}", args.input))?;

    let rows = rows_from_str(&data)?;

    if args.items {
        let items = read_rows(&rows);
        println!("{}", serde_json::to_string_pretty(&items)?);
        return Ok(());
    }

    let html = render_static(
        &rows,
        RenderMode::detect(args.preview),
        &TimelineConfig::default(),
    )?;
    if html.is_empty() {
        eprintln!("Không có hàng hợp lệ trong {:?}", args.input);
    } else {
        println!("{html}");
    }

    Ok(())
}
