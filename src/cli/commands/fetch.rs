//! Fetch command handler: harvest a channel into memory and show it.

use crate::clients::youtube::YouTubeClient;
use crate::config::Config;
use crate::models::bundle::ChannelBundle;

pub async fn cmd_fetch(config: &Config, channel_id: &str, json: bool) -> anyhow::Result<()> {
    let client = YouTubeClient::new(config.api_key()?);
    let bundle = client.fetch_channel_bundle(channel_id).await?;

    if json {
        println!("{}", serde_json::to_string_pretty(&bundle)?);
        return Ok(());
    }

    print_summary(&bundle);
    println!();
    println!("Nothing stored. Run: tubevault harvest {channel_id}");

    Ok(())
}

pub(super) fn print_summary(bundle: &ChannelBundle) {
    let channel = &bundle.channel;

    println!("Channel: {} ({})", channel.channel_name, channel.channel_id);
    println!("{:-<70}", "");
    println!(
        "  Status: {} | {} | {} subscribers | {} total views",
        channel.channel_status,
        channel.channel_verified_status,
        channel.subscriber_count,
        channel.channel_views
    );
    println!(
        "  Uploads playlist: {} | {} videos | {} comments",
        channel.uploads_playlist_id,
        bundle.videos.len(),
        bundle.comments.len()
    );
}
