pub mod douban;
pub mod qq;
pub mod twitter;
pub mod weibo;
