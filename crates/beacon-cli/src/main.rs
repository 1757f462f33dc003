use std::sync::Arc;

use anyhow::Context;
use tokio::io::{AsyncBufReadExt, BufReader};
use tokio::time::{Duration, sleep};
use tracing::{info, warn};
use tracing_subscriber::{EnvFilter, fmt};

use beacon_core::app::AppBuilder;
use beacon_core::domain::RecipientKey;
use beacon_core::impls::InMemoryRooms;
use beacon_core::ports::RoomTransport;
use beacon_core::queue::QueueOptions;

const DEFAULT_STREAMER: &str = "0x4343";

/// 使い方:
/// ```text
/// cat events.ndjson | RUST_LOG=beacon_core=debug beacon-cli [streamer-address]
/// ```
/// 1 行 1 イベント（ChainEvent の JSON）を読み、ダッシュボード役のクライアントに
/// 届いたフレームを標準出力に書く。全キューが空になったら終了する。
#[tokio::main]
async fn main() -> anyhow::Result<()> {
    fmt().with_env_filter(EnvFilter::from_default_env()).init();

    let streamer = std::env::args()
        .nth(1)
        .unwrap_or_else(|| DEFAULT_STREAMER.to_string());

    // (A) 設定は環境変数から（未設定の項目はデフォルト）
    let options = QueueOptions::from_env().context("reading queue options")?;
    let rooms = Arc::new(InMemoryRooms::new());
    let app = AppBuilder::new()
        .options(options)
        .transport(rooms.clone())
        .build()?;

    // (B) ダッシュボード役のクライアントを stream key で認証させる
    let record = app.streamers.register(RecipientKey::new(&streamer)).await;
    let (client, mut frames) = rooms.connect();
    app.gateway
        .authenticate(client, Some(record.stream_key.as_str()))
        .await
        .context("demo dashboard could not authenticate")?;

    let printer = tokio::spawn(async move {
        while let Some(frame) = frames.recv().await {
            match serde_json::to_string(&frame) {
                Ok(line) => println!("{line}"),
                Err(e) => warn!(error = %e, "frame not printable"),
            }
        }
    });

    // (C) stdin のイベントを流し込む
    let mut lines = BufReader::new(tokio::io::stdin()).lines();
    let mut handled = 0usize;
    while let Some(line) = lines.next_line().await? {
        let line = line.trim();
        if line.is_empty() {
            continue;
        }
        match app.ingestor.handle_json(line).await {
            Ok(()) => handled += 1,
            Err(e) => warn!(error = %e, "event skipped"),
        }
    }
    info!(handled, %streamer, "input exhausted, waiting for queues to drain");

    // (D) 全 recipient の processor が退場するまで待つ
    while !app.queue.snapshot().is_idle() {
        sleep(Duration::from_millis(50)).await;
    }
    info!(snapshot = ?app.queue.snapshot(), "all alerts delivered");

    rooms.disconnect(client);
    printer.await?;
    Ok(())
}
