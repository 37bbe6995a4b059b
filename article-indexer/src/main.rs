use chrono::Local;

use article_indexer::config::{self, IndexerConfig};
use article_indexer::{generate_index, init_logging};

fn main() {
    let matches = config::command().get_matches();
    let config = IndexerConfig::from_matches(&matches);
    init_logging(config.verbosity);

    println!("开始生成索引...");
    println!("文章来源: {}", config.posts.display());
    println!("输出目录: {}", config.output.display());

    match generate_index(&config) {
        Ok(summary) => {
            println!(
                "索引生成完成！{} 篇文章，{} 个目录标题，耗时: {:.2}秒",
                summary.posts, summary.headings, summary.elapsed_secs
            );
            println!("筛选索引: {}", summary.filter_index.display());
            println!("搜索索引: {}", summary.search_index.display());
            println!("完成时间: {}", Local::now().format("%Y-%m-%d %H:%M:%S"));
        }
        Err(e) => {
            tracing::error!(error = %e, "索引生成失败");
            eprintln!("错误: 索引生成失败: {}", e);
            std::process::exit(1);
        }
    }
}
