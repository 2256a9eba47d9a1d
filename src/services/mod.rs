pub mod pdf_scraper;
pub mod question_sampler;
pub mod topic_store;

pub use pdf_scraper::scrape_pdf_text;
pub use question_sampler::{sample_default, sample_from_topic, QUESTIONS_PER_TEST};
pub use topic_store::{LoadResult, TopicStore};
