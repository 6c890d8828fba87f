// ==========================================
// 制作進行管理 - 主入口
// ==========================================
// 打开默认数据库,输出当前作品的进捗集计 (JSON)
// 命令行解析不在本程序范围内
// ==========================================

use seishin::app::{get_default_db_path, AppState};
use std::process::ExitCode;

fn main() -> ExitCode {
    seishin::logging::init();

    tracing::info!("==================================================");
    tracing::info!("{} v{}", seishin::APP_NAME, seishin::VERSION);
    tracing::info!("==================================================");

    let db_path = get_default_db_path();
    tracing::info!("使用数据库: {}", db_path);

    let state = match AppState::new(db_path) {
        Ok(state) => state,
        Err(e) => {
            tracing::error!("AppState初始化失败: {}", e);
            return ExitCode::FAILURE;
        }
    };

    match state.config_manager.locale() {
        Ok(locale) => seishin::i18n::set_locale(&locale),
        Err(e) => tracing::warn!("读取语言设置失败: {}", e),
    }

    let project = match state.project_api.active_project() {
        Ok(project) => project,
        Err(e) if e.is_not_found() => {
            tracing::warn!("未设置当前作品");
            return ExitCode::SUCCESS;
        }
        Err(e) => {
            tracing::error!("读取当前作品失败: {}", e);
            return ExitCode::FAILURE;
        }
    };

    let progress = match state.pipeline_api.aggregate_progress(project.id) {
        Ok(progress) => progress,
        Err(e) => {
            tracing::error!("进捗集计失败: {}", e);
            return ExitCode::FAILURE;
        }
    };

    match serde_json::to_string_pretty(&progress) {
        Ok(json) => {
            println!("{}", json);
            ExitCode::SUCCESS
        }
        Err(e) => {
            tracing::error!("JSON 序列化失败: {}", e);
            ExitCode::FAILURE
        }
    }
}
