use std::path::PathBuf;

use clap::Parser;

#[derive(Parser, Debug)]
#[clap(
    author,
    version,
    about = "Dump the files of a moodle course",
    long_about = "Provide --token and --url (or MOODLE_TOKEN / MOODLE_URL) and start dumping your moodle files."
)]
pub struct Cli {
    #[clap(
        long,
        env = "MOODLE_URL",
        help = "Moodle instance url or full rest endpoint (.../webservice/rest/server.php)"
    )]
    pub url: Option<String>,

    #[clap(
        long,
        env = "MOODLE_TOKEN",
        hide_env_values = true,
        help = "Your token from the moodle security keys page"
    )]
    pub token: Option<String>,

    #[clap(long, help = "The id of the course to download, asks if missing")]
    pub cid: Option<u64>,

    #[clap(long, help = "Where to save the files, defaults to the current directory")]
    pub save_path: Option<PathBuf>,

    #[clap(long, help = "Path to an optional yaml config")]
    pub config: Option<PathBuf>,

    #[clap(long, short = 'y', help = "Download without asking for confirmation")]
    pub yes: bool,

    #[clap(long, help = "Also download assignment attachments")]
    pub assignments: bool,

    #[clap(long, help = "Number of files downloaded at the same time")]
    pub parallel_downloads: Option<usize>,

    #[clap(long, help = "Append the download log to this file")]
    pub log_file: Option<PathBuf>,
}
