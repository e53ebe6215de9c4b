use std::collections::HashSet;
use std::fs;
use std::path::Path;
use clap::{Arg, ArgAction, Command};
use tracing_subscriber::filter::LevelFilter;
use tracing_subscriber::EnvFilter;
use walkdir::WalkDir;

use list_filter::{parse_entities, CatalogBuilder};
use utils_common::Entity;

/// 扫描结果
#[derive(Debug, Default)]
struct ScanReport {
    entities: Vec<Entity>,
    files: usize,
    skipped_records: usize,
    skipped_files: usize,
}

fn main() {
    let matches = Command::new("列表目录生成器")
        .version(env!("CARGO_PKG_VERSION"))
        .about("把论坛、社团、职位的JSON导出生成为浏览器端使用的压缩目录")
        .arg(Arg::new("source")
            .short('s')
            .long("source")
            .value_name("SOURCE_DIR")
            .help("JSON导出所在目录")
            .required(true))
        .arg(Arg::new("output")
            .short('o')
            .long("output")
            .value_name("OUTPUT_DIR")
            .help("目录快照输出目录")
            .required(true))
        .arg(Arg::new("verbose")
            .short('v')
            .long("verbose")
            .help("显示详细信息")
            .action(ArgAction::SetTrue))
        .get_matches();

    let verbose = matches.get_flag("verbose");
    init_logging(verbose);

    let (Some(source_dir), Some(output_dir)) = (
        matches.get_one::<String>("source"),
        matches.get_one::<String>("output"),
    ) else {
        eprintln!("错误: 缺少 --source 或 --output 参数");
        std::process::exit(2);
    };

    let source_path = Path::new(source_dir);
    if !source_path.is_dir() {
        eprintln!("错误: 源目录不存在或不是有效目录 '{}'", source_dir);
        std::process::exit(1);
    }

    let output_path = Path::new(output_dir);
    if let Err(e) = fs::create_dir_all(output_path) {
        eprintln!("错误: 无法创建输出目录 '{}': {}", output_dir, e);
        std::process::exit(1);
    }

    match generate_catalog(source_path, output_path) {
        Ok(count) => println!("目录生成成功！共 {} 个条目", count),
        Err(e) => {
            eprintln!("错误: 目录生成失败: {}", e);
            std::process::exit(1);
        }
    }
}

fn init_logging(verbose: bool) {
    let default_level = if verbose { LevelFilter::DEBUG } else { LevelFilter::INFO };
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::builder()
                .with_default_directive(default_level.into())
                .from_env_lossy(),
        )
        .with_writer(std::io::stderr)
        .init();
}

/// 扫描、校验并写出目录快照，返回写入的条目数
fn generate_catalog(source_dir: &Path, output_dir: &Path) -> Result<usize, String> {
    let start_time = std::time::Instant::now();

    let report = scan_json_files(source_dir)?;
    println!(
        "扫描完成。{} 个文件，{} 个有效条目，跳过 {} 条记录、{} 个文件。",
        report.files,
        report.entities.len(),
        report.skipped_records,
        report.skipped_files
    );

    if report.entities.is_empty() {
        return Err("没有找到有效条目".to_string());
    }

    let count = report.entities.len();
    let mut builder = CatalogBuilder::new();
    for entity in report.entities {
        builder.add_entity(entity);
    }

    let catalog_path = output_dir.join("catalog.bin");
    let bytes = builder
        .save(&catalog_path)
        .map_err(|e| format!("保存目录快照失败: {}", e))?;

    println!(
        "目录快照已写入 {} ({} 字节)，耗时 {:.2} 秒",
        catalog_path.display(),
        bytes,
        start_time.elapsed().as_secs_f32()
    );
    Ok(count)
}

/// 递归读取目录下所有 `.json` 文件; id 重复时保留先出现的条目
fn scan_json_files(dir: &Path) -> Result<ScanReport, String> {
    let mut report = ScanReport::default();
    let mut seen: HashSet<String> = HashSet::new();

    let mut paths = Vec::new();
    for entry in WalkDir::new(dir).sort_by_file_name() {
        let entry = entry.map_err(|e| format!("遍历目录时出错: {}", e))?;
        let is_json = entry.path().extension().is_some_and(|ext| ext == "json");
        if entry.file_type().is_file() && is_json {
            paths.push(entry.into_path());
        }
    }

    for path in paths {
        report.files += 1;

        let json = match fs::read_to_string(&path) {
            Ok(json) => json,
            Err(e) => {
                tracing::warn!(path = %path.display(), error = %e, "无法读取文件");
                report.skipped_files += 1;
                continue;
            }
        };

        let ingested = match parse_entities(&json) {
            Ok(ingested) => ingested,
            Err(e) => {
                tracing::warn!(path = %path.display(), error = %e, "无法解析文件");
                report.skipped_files += 1;
                continue;
            }
        };

        tracing::debug!(
            path = %path.display(),
            valid = ingested.entities.len(),
            skipped = ingested.skipped,
            "已读取文件"
        );
        report.skipped_records += ingested.skipped;

        for entity in ingested.entities {
            if seen.insert(entity.id.clone()) {
                report.entities.push(entity);
            } else {
                tracing::warn!(id = %entity.id, path = %path.display(), "跳过重复的条目");
                report.skipped_records += 1;
            }
        }
    }

    Ok(report)
}

#[cfg(test)]
mod tests {
    use super::*;
    use list_filter::Catalog;

    fn record(id: &str, category: &str) -> String {
        format!(
            r#"{{ "id": "{id}", "title": "{id}", "category": "{category}",
                 "created_at": "2024-05-01T00:00:00Z", "tags": ["t"] }}"#
        )
    }

    #[test]
    fn scan_dedupes_and_skips_bad_input() {
        let dir = tempfile::tempdir().unwrap();
        fs::write(
            dir.path().join("a_forums.json"),
            format!("[{}, {}, {{\"id\": \"broken\"}}]", record("f1", "Technology"), record("f2", "Design")),
        )
        .unwrap();
        fs::create_dir(dir.path().join("nested")).unwrap();
        fs::write(
            dir.path().join("nested").join("b_groups.json"),
            format!("[{}, {}]", record("f1", "Other"), record("g1", "Hobbies")),
        )
        .unwrap();
        fs::write(dir.path().join("c_bad.json"), "{ not json").unwrap();
        fs::write(dir.path().join("notes.txt"), "ignored").unwrap();

        let report = scan_json_files(dir.path()).unwrap();
        let ids: Vec<_> = report.entities.iter().map(|e| e.id.as_str()).collect();
        assert_eq!(ids, ["f1", "f2", "g1"]);
        assert_eq!(report.entities[0].category, "Technology");
        assert_eq!(report.files, 3);
        assert_eq!(report.skipped_files, 1);
        assert_eq!(report.skipped_records, 2);
    }

    #[test]
    fn generate_writes_loadable_catalog() {
        let src = tempfile::tempdir().unwrap();
        let out = tempfile::tempdir().unwrap();
        fs::write(
            src.path().join("jobs.json"),
            format!("[{}, {}]", record("j1", "Engineering"), record("j2", "Design")),
        )
        .unwrap();

        assert_eq!(generate_catalog(src.path(), out.path()).unwrap(), 2);

        let bytes = fs::read(out.path().join("catalog.bin")).unwrap();
        let catalog = Catalog::from_compressed(&bytes).unwrap();
        assert_eq!(catalog.len(), 2);
        assert_eq!(catalog.categories(), ["Design", "Engineering"]);
    }

    #[test]
    fn generate_fails_without_entities() {
        let src = tempfile::tempdir().unwrap();
        let out = tempfile::tempdir().unwrap();
        fs::write(src.path().join("empty.json"), "[]").unwrap();
        assert!(generate_catalog(src.path(), out.path()).is_err());
    }
}
