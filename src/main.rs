// ==========================================
// Bullet Points - 命令行入口
// ==========================================
// 用法:
//   bullet-points [db_path] --attributes 1,2 [--categories 3] [--skus A1,A2] [--scope 1]
//
// 输出: BatchResult（JSON）
// 日志: 写 stderr; RUST_LOG 控制级别, BULLET_POINTS_LOG_JSON=1 输出 JSON
// ==========================================

use std::convert::Infallible;
use std::path::PathBuf;
use std::sync::atomic::Ordering;

use anyhow::{Context, Result};
use bullet_points::api::{parse_id_list, parse_sku_list, BulletPointsApi, GenerateRequest};
use bullet_points::logging;
use clap::Parser;

// 逗号分隔的列表作为单个参数值解析
type IdList = Vec<i64>;
type SkuList = Vec<String>;

#[derive(Parser, Debug)]
#[command(name = "bullet-points", version)]
#[command(about = "按作用域解析属性值, 渲染定义列表并写回派生属性")]
struct Cli {
    /// SQLite 数据库路径（缺省: BULLET_POINTS_DB_PATH 或用户数据目录）
    db_path: Option<String>,

    /// 来源属性 ID, 逗号分隔（同时决定渲染顺序）
    #[arg(long, value_parser = parse_id_list)]
    attributes: IdList,

    /// 类目 ID, 逗号分隔
    #[arg(long, value_parser = parse_id_list)]
    categories: Option<IdList>,

    /// SKU, 逗号分隔
    #[arg(long, value_parser = sku_list)]
    skus: Option<SkuList>,

    /// 覆盖配置中的作用域（仅本次执行）
    #[arg(long)]
    scope: Option<i64>,
}

impl Cli {
    fn into_request(self) -> (String, GenerateRequest) {
        let db_path = self.db_path.unwrap_or_else(default_db_path);
        let request = GenerateRequest {
            attribute_ids: self.attributes,
            category_ids: self.categories.unwrap_or_default(),
            skus: self.skus.unwrap_or_default(),
            scope_id: self.scope,
        };
        (db_path, request)
    }
}

fn sku_list(raw: &str) -> Result<SkuList, Infallible> {
    Ok(parse_sku_list(raw))
}

#[tokio::main]
async fn main() -> Result<()> {
    logging::init();

    let (db_path, request) = Cli::parse().into_request();
    tracing::info!(version = bullet_points::VERSION, db_path = %db_path, "bullet-points 启动");

    let api = BulletPointsApi::new(&db_path).with_context(|| format!("无法打开数据库: {}", db_path))?;

    let cancel_flag = api.cancel_flag();
    tokio::spawn(async move {
        if tokio::signal::ctrl_c().await.is_ok() {
            tracing::warn!("收到中断信号,当前实体处理完后停止");
            cancel_flag.store(true, Ordering::SeqCst);
        }
    });

    let result = api.generate(&request).await?;
    println!("{}", serde_json::to_string_pretty(&result)?);

    if result.has_errors() {
        std::process::exit(2);
    }
    Ok(())
}

/// 默认数据库路径
///
/// 优先级: BULLET_POINTS_DB_PATH > 用户数据目录 > 当前目录
fn default_db_path() -> String {
    if let Ok(path) = std::env::var("BULLET_POINTS_DB_PATH") {
        let trimmed = path.trim();
        if !trimmed.is_empty() {
            return trimmed.to_string();
        }
    }

    let mut path = PathBuf::from("./bullet_points.db");
    if let Some(data_dir) = dirs::data_dir() {
        let app_dir = data_dir.join(bullet_points::APP_NAME);
        if std::fs::create_dir_all(&app_dir).is_ok() {
            path = app_dir.join("bullet_points.db");
        }
    }

    path.to_string_lossy().to_string()
}

#[cfg(test)]
mod tests {
    use super::*;

    fn parse(args: &[&str]) -> Result<(String, GenerateRequest), clap::Error> {
        Cli::try_parse_from(std::iter::once("bullet-points").chain(args.iter().copied()))
            .map(Cli::into_request)
    }

    #[test]
    fn test_parse_args_full() {
        let (db_path, request) = parse(&[
            "catalog.db",
            "--attributes",
            "10,11",
            "--categories",
            "3",
            "--skus",
            "A1, A2",
            "--scope",
            "1",
        ])
        .unwrap();

        assert_eq!(db_path, "catalog.db");
        assert_eq!(request.attribute_ids, vec![10, 11]);
        assert_eq!(request.category_ids, vec![3]);
        assert_eq!(request.skus, vec!["A1".to_string(), "A2".to_string()]);
        assert_eq!(request.scope_id, Some(1));
    }

    #[test]
    fn test_parse_args_optional_filters_default_to_empty() {
        let (_, request) = parse(&["catalog.db", "--attributes", "10", "--skus", "A1"]).unwrap();

        assert!(request.category_ids.is_empty());
        assert_eq!(request.scope_id, None);
    }

    #[test]
    fn test_parse_args_rejects_unknown_flag_and_missing_value() {
        assert!(parse(&["--colour", "red"]).is_err());
        assert!(parse(&["db", "--attributes"]).is_err());
        assert!(parse(&["db", "--attributes", "1,x"]).is_err());
        assert!(parse(&["db", "--attributes", "1", "--scope", "x"]).is_err());
        // --attributes 必填
        assert!(parse(&["db", "--skus", "A1"]).is_err());
    }

    #[test]
    fn test_cli_definition_is_consistent() {
        use clap::CommandFactory;
        Cli::command().debug_assert();
    }
}
