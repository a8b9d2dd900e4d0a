use std::path::Path;

use indicatif::ProgressStyle;
use reqwest::RequestBuilder;
use tokio::{fs, fs::File, io::AsyncWriteExt};
use tokio_stream::StreamExt;
use tracing::{Span, instrument};
use tracing_indicatif::span_ext::IndicatifSpanExt;

use super::*;

/// Streams the response of `request` into `file_path`, replacing an existing file
///
/// The body goes to `tmp_path` first and is only moved over `file_path` once
/// complete. Errors do not contain the request url, as it carries the token.
#[instrument(skip(file_path, tmp_path, request))]
pub async fn force_download_file(
    file_path: &Path,
    tmp_path: &Path,
    request: RequestBuilder,
) -> Result<()> {
    // Make sure path exists
    ensure_path_exists(file_path).await?;

    // Send request and get response
    let response = request
        .send()
        .await
        .and_then(|response| response.error_for_status())
        .map_err(|e| e.without_url())?;
    let total_size = response
        .headers()
        .get(reqwest::header::CONTENT_LENGTH)
        .and_then(|ct_len| ct_len.to_str().ok())
        .and_then(|ct_len| ct_len.parse::<u64>().ok());

    // Animation
    let filename = file_path
        .file_name()
        .and_then(|name| name.to_str())
        .unwrap_or("Unknown Filename");
    if let Some(total_size) = total_size {
        let template = format!(
            "{{spinner:.green}} [{{elapsed_precise}}] [{{bar:40.cyan/blue}}] {{bytes}}/{{total_bytes}} ({{eta}}) File: {}",
            filename
        );
        Span::current().pb_set_style(
            &ProgressStyle::default_bar()
                .template(&template)?
                .progress_chars("#>-"),
        );
        Span::current().pb_set_length(total_size);
    } else {
        let template = format!(
            "{{spinner:.green}} [{{elapsed_precise}}] {{bytes}} File: {}",
            filename
        );
        Span::current().pb_set_style(&ProgressStyle::default_spinner().template(&template)?);
    }
    Span::current().pb_set_position(0);
    let mut downloaded: u64 = 0;

    // Download file
    let mut file = File::create(tmp_path).await?;
    let mut stream = response.bytes_stream();
    while let Some(chunk_result) = stream.next().await {
        let chunk = chunk_result.map_err(|e| e.without_url())?;
        file.write_all(&chunk).await?;
        // Increment bar
        downloaded += chunk.len() as u64;
        Span::current().pb_set_position(downloaded);
    }
    file.flush().await?;
    drop(file);

    // Move file to destination, windows refuses to rename over an existing file
    #[cfg(windows)]
    let _ = fs::remove_file(file_path).await;
    fs::rename(tmp_path, file_path).await?;

    Ok(())
}
