//! Harvest command handler: fetch a channel and replace its stored rows.

use crate::clients::youtube::YouTubeClient;
use crate::config::Config;
use crate::db::Store;

pub async fn cmd_harvest(config: &Config, channel_id: &str) -> anyhow::Result<()> {
    let client = YouTubeClient::new(config.api_key()?);

    // The bundle is an explicit value handed from fetch to store; nothing
    // ambient survives this call.
    let bundle = client.fetch_channel_bundle(channel_id).await?;
    super::fetch::print_summary(&bundle);

    let store = Store::with_pool_options(
        &config.general.database_path,
        config.general.max_db_connections,
        config.general.min_db_connections,
    )
    .await?;

    let report = store.replace_channel_data(&bundle).await?;

    println!();
    println!(
        "Stored: {} channel, {} playlist(s), {} video(s), {} comment(s)",
        report.channels_inserted,
        report.playlists_inserted,
        report.videos_inserted,
        report.comments_inserted
    );

    for warning in &report.warnings {
        println!("warning: {warning}");
    }

    Ok(())
}
