use clap::Parser;

use crate::{infrastructure::config::Config, utils::version};

#[derive(Parser, Debug, Default)]
#[command(author, version = version(), about)]
pub struct Cli {
    /// Records per page (overrides feed.page_size)
    #[arg(short, long, value_name = "COUNT")]
    pub page_size: Option<usize>,

    /// Distance from the bottom, in pixels, that triggers the next page
    #[arg(long, value_name = "PIXELS")]
    pub scroll_threshold: Option<f64>,

    /// Artificial store latency in milliseconds
    #[arg(short, long, value_name = "MILLIS")]
    pub latency_ms: Option<u64>,

    /// Number of comments to seed into the store
    #[arg(short, long, value_name = "COUNT")]
    pub comments: Option<usize>,

    /// Number of feedback entries to seed into the store
    #[arg(short, long, value_name = "COUNT")]
    pub feedback: Option<usize>,
}

impl Cli {
    /// Applies command line overrides on top of a loaded configuration
    pub fn apply(&self, config: &mut Config) {
        if let Some(page_size) = self.page_size {
            config.feed.page_size = page_size.max(1);
        }
        if let Some(threshold) = self.scroll_threshold {
            config.feed.scroll_threshold_px = threshold;
        }
        if let Some(latency_ms) = self.latency_ms {
            config.store.latency_ms = latency_ms;
        }
        if let Some(comments) = self.comments {
            config.seed.comments = comments;
        }
        if let Some(feedback) = self.feedback {
            config.seed.feedback = feedback;
        }
    }
}
