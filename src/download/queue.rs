use std::sync::Arc;

use anyhow::{Context, anyhow};
use async_channel::{Receiver, Sender};
use futures::future::join_all;
use tokio::fs;
use tracing::{debug, trace};
use url::Url;

use super::{request::force_download_file, *};

use crate::config::Config;

type Job = (usize, DownloadItem);

impl Config {
    /// Downloads a single item, `index` keeps temporary files of equally named items apart
    async fn download_item(&self, index: usize, item: &DownloadItem) -> Result<PathBuf> {
        let filename = derive_filename(&item.url);
        if filename.is_empty() {
            return Err(anyhow!("Could not derive a file name from {}", item.url));
        }
        let file_path = item.folder.join(&filename);
        let tmp_path = item.folder.join(format!(".{}.{}.part", filename, index));
        let existed = fs::try_exists(&file_path).await.unwrap_or(false);

        let url = Url::parse(&item.url).with_context(|| format!("Invalid download url {}", item.url))?;
        // The token only goes to the moodle instance itself, never to linked sites
        let request = if self.api.serves(&url) {
            self.api.client.get(url).query(&[("token", self.api.wstoken())])
        } else {
            debug!("{} is not served by moodle, requesting without token", item.url);
            self.api.client.get(url)
        };
        if let Err(e) = force_download_file(&file_path, &tmp_path, request).await {
            let _ = fs::remove_file(&tmp_path).await;
            return Err(e.context(format!(
                "Failed downloading {} to {}",
                item.url,
                file_path.display()
            )));
        }

        let message = file_path.display().to_string();
        if existed {
            self.status_bar.register_updated(&message).await;
        } else {
            self.status_bar.register_new(&message).await;
        }
        Ok(file_path)
    }

    async fn download_report(&self, index: usize, item: DownloadItem) -> DownloadReport {
        let result = self.download_item(index, &item).await;
        if let Err(e) = &result {
            self.status_bar.register_err(&format!("{:#}", e)).await;
        }
        DownloadReport {
            url: item.url,
            result,
        }
    }

    async fn download_thread(&self, jobs: Receiver<Job>, reports: Sender<(usize, DownloadReport)>) {
        while let Ok((index, item)) = jobs.recv().await {
            trace!("Worker picked up {}", item.url);
            let report = self.download_report(index, item).await;
            if reports.send((index, report)).await.is_err() {
                break;
            }
        }
    }

    /// Attempts every item and reports the outcome of each, in input order
    ///
    /// Runs one item after another, or `parallel_downloads` at a time.
    pub async fn download_all(config: Arc<Config>, items: Vec<DownloadItem>) -> Vec<DownloadReport> {
        let workers = config.parallel_downloads.min(items.len());
        if workers <= 1 {
            let mut reports = Vec::with_capacity(items.len());
            for (index, item) in items.into_iter().enumerate() {
                reports.push(config.download_report(index, item).await);
            }
            return reports;
        }

        debug!("Downloading {} files using {} workers", items.len(), workers);
        let urls: Vec<String> = items.iter().map(|item| item.url.clone()).collect();
        let (job_sender, job_receiver) = async_channel::unbounded::<Job>();
        let (report_sender, report_receiver) = async_channel::unbounded();

        let mut threads = Vec::with_capacity(workers);
        for _ in 0..workers {
            let thread_self = config.clone();
            let jobs = job_receiver.clone();
            let reports = report_sender.clone();
            threads.push(tokio::spawn(async move {
                thread_self.download_thread(jobs, reports).await;
            }));
        }
        // Only the workers may keep the channels open
        drop(job_receiver);
        drop(report_sender);

        for job in items.into_iter().enumerate() {
            if job_sender.send(job).await.is_err() {
                break;
            }
        }
        job_sender.close();
        join_all(threads).await;

        let mut slots: Vec<Option<DownloadReport>> = urls.iter().map(|_| None).collect();
        while let Ok((index, report)) = report_receiver.recv().await {
            slots[index] = Some(report);
        }

        let mut reports = Vec::with_capacity(slots.len());
        for (slot, url) in slots.into_iter().zip(urls) {
            match slot {
                Some(report) => reports.push(report),
                None => {
                    // Only happens if a worker died
                    let error = anyhow!("Download of {} was never finished", url);
                    config.status_bar.register_err(&error.to_string()).await;
                    reports.push(DownloadReport {
                        url,
                        result: Err(error),
                    });
                }
            }
        }
        reports
    }
}
