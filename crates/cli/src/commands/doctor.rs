//! `mindmate doctor` — Diagnose configuration and endpoint health.

use mindmate_config::AppConfig;

pub async fn run() -> Result<(), Box<dyn std::error::Error>> {
    println!("🩺 MindMate Doctor — Diagnostics");
    println!("================================\n");

    let mut issues = 0;

    let config_path = AppConfig::config_dir().join("config.toml");
    if config_path.exists() {
        println!("  ✅ Config file found");
    } else {
        println!("  ⚠️  No config file — run `mindmate onboard` (defaults in use)");
    }

    let config = match AppConfig::load() {
        Ok(config) => {
            println!("  ✅ Config valid");
            Some(config)
        }
        Err(e) => {
            println!("  ❌ Config invalid: {e}");
            issues += 1;
            None
        }
    };

    if let Some(config) = config {
        if config.resolved_api_key().is_some() {
            println!("  ✅ API key configured");

            let client = mindmate_providers::build_client(&config);
            match client.health_check().await {
                Ok(true) => println!("  ✅ Completion endpoint reachable ({})", config.api_url),
                Ok(false) => {
                    println!("  ⚠️  Completion endpoint rejected the health check");
                    issues += 1;
                }
                Err(e) => {
                    println!("  ❌ Completion endpoint unreachable: {e}");
                    issues += 1;
                }
            }
        } else {
            println!("  ❌ No usable API key (missing, empty, or a PASTE_… placeholder)");
            issues += 1;
        }

        if let Some(path) = &config.knowledge.file {
            if path.exists() {
                println!("  ✅ Knowledge file found: {}", path.display());
            } else {
                println!(
                    "  ⚠️  Knowledge file missing: {} (empty advice table in use)",
                    path.display()
                );
                issues += 1;
            }
        }
    }

    println!();
    if issues == 0 {
        println!("  🎉 All checks passed!");
    } else {
        println!("  ⚠️  {issues} issue(s) found. See above for details.");
    }

    Ok(())
}
