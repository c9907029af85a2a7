use anyhow::Result;
use clap::{value_parser, Arg, Command};

use flint::common::{start_application, StartupConfig};

#[tokio::main]
async fn main() -> Result<()> {
    // 解析命令行参数
    let matches = Command::new("flint")
        .version(env!("CARGO_PKG_VERSION"))
        .about("按名称路由的计算集群")
        .arg(
            Arg::new("config")
                .short('c')
                .long("config")
                .value_name("FILE")
                .help("配置文件路径（缺省时按默认路径查找）"),
        )
        .arg(
            Arg::new("log-level")
                .short('l')
                .long("log-level")
                .value_name("LEVEL")
                .help("日志级别")
                .value_parser(["trace", "debug", "info", "warn", "error"])
                .default_value("info"),
        )
        .arg(
            Arg::new("log-format")
                .long("log-format")
                .value_name("FORMAT")
                .help("日志格式")
                .value_parser(["json", "pretty"])
                .default_value("pretty"),
        )
        .arg(
            Arg::new("workers")
                .short('w')
                .long("workers")
                .value_name("N")
                .help("Worker数量，覆盖配置")
                .value_parser(value_parser!(u32)),
        )
        .get_matches();

    let startup_config = StartupConfig {
        config_path: matches.get_one::<String>("config").cloned(),
        log_level: matches
            .get_one::<String>("log-level")
            .cloned()
            .unwrap_or_else(|| "info".to_string()),
        log_format: matches
            .get_one::<String>("log-format")
            .cloned()
            .unwrap_or_else(|| "pretty".to_string()),
        workers: matches.get_one::<u32>("workers").copied(),
    };

    start_application(startup_config).await
}
