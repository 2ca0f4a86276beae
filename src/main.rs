use anyhow::Context;
use clap::Parser;
use dialoguer::Select;
use plant_care_common::{Candidate, Coordinates, Language};
use plant_care_rust::api::Services;
use plant_care_rust::cli::{Cli, Commands};
use plant_care_rust::config::Config;
use plant_care_rust::controller::Controller;
use plant_care_rust::geo::{self, ExifLocation, FixedLocation, LocationSource};
use plant_care_rust::{media, render};
use std::time::Duration;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();
    init_tracing(cli.verbose);

    let config = Config::load()?;

    match cli.command {
        Commands::Identify {
            image,
            lang,
            lat,
            lon,
            no_exif_location,
            select,
            interactive,
            json,
        } => {
            let language = lang.unwrap_or(config.language);
            let fixed = match (lat, lon) {
                (Some(lat), Some(lon)) => Some(
                    Coordinates::new(lat, lon)
                        .with_context(|| format!("座標が範囲外です: {}, {}", lat, lon))?,
                ),
                _ => None,
            };

            let mut controller = build_controller(&config, language)?;
            if let Err(e) = controller.ensure_credentials() {
                println!("{}", render::render_session(controller.session()));
                return Err(e.into());
            }

            println!("[1/3] 写真を読み込み中...");
            let loaded = media::load_image(&image, config.max_image_size)?;
            if loaded.resized {
                let (width, height) = loaded.dimensions;
                println!("✔ {}x{} → 縮小してアップロード", width, height);
            }

            let mut sources: Vec<Box<dyn LocationSource>> = Vec::new();
            if let Some(coordinates) = fixed {
                sources.push(Box::new(FixedLocation(coordinates)));
            }
            if !no_exif_location {
                sources.push(Box::new(ExifLocation(loaded.exif.coordinates)));
            }
            let location = geo::acquire_hint(
                &sources,
                Duration::from_millis(config.geolocation_timeout_ms),
            )
            .await;
            controller.set_location(location);
            controller.choose_image(loaded.data);

            println!("[2/3] 識別中...");
            if let Err(e) = controller.identify().await {
                println!("{}", render::render_session(controller.session()));
                return Err(e.into());
            }
            println!("✔ {}件の候補\n", controller.session().candidates().len());

            if let Some(number) = select {
                // 1始まり（0 はパース時に弾く）
                controller.select(usize::try_from(number - 1)?)?;
            }

            println!("[3/3] 育て方を取得中...\n");
            controller.settle().await;

            if json {
                println!("{}", serde_json::to_string_pretty(controller.session())?);
            } else {
                println!("{}", render::render_session(controller.session()));
            }

            if interactive {
                run_interactive(&mut controller).await?;
            }
        }

        Commands::Care { name, lang } => {
            let language = lang.unwrap_or(config.language);
            let mut controller = build_controller(&config, language)?;

            controller.present_candidates(vec![Candidate::named(name)]);
            controller.select(0)?;
            controller.settle().await;

            if let Some(guide) = render::render_care_guide(controller.session()) {
                println!("{}", guide);
            }
        }

        Commands::Config {
            set_plant_id_key,
            set_perenual_key,
            set_language,
            set_auto_enrich,
            show,
        } => {
            let mut config = config;
            let changed = set_plant_id_key.is_some()
                || set_perenual_key.is_some()
                || set_language.is_some()
                || set_auto_enrich.is_some();

            if let Some(key) = set_plant_id_key {
                config.plant_id_api_key = Some(key);
                println!("✔ Plant.id APIキーを設定しました");
            }
            if let Some(key) = set_perenual_key {
                config.perenual_api_key = Some(key);
                println!("✔ Perenual APIキーを設定しました");
            }
            if let Some(language) = set_language {
                config.language = language;
                println!("✔ 表示言語を {} に設定しました", language);
            }
            if let Some(enabled) = set_auto_enrich {
                config.auto_enrich_top = enabled;
            }
            if changed {
                config.save()?;
            }

            if show || !changed {
                print_config(&config)?;
            }
        }
    }

    Ok(())
}

fn init_tracing(verbose: bool) {
    let default_filter = if verbose { "plant_care_rust=debug" } else { "warn" };
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| default_filter.into()),
        )
        .with(tracing_subscriber::fmt::layer().with_writer(std::io::stderr))
        .init();
}

fn build_controller(config: &Config, language: Language) -> anyhow::Result<Controller> {
    let services = Services::from_config(config)?;
    Ok(Controller::new(
        config.credentials(),
        config.auto_enrich_top.into(),
        services,
        language,
    ))
}

/// 候補を選び直すたびに補完をやり直す
async fn run_interactive(controller: &mut Controller) -> anyhow::Result<()> {
    loop {
        let mut items: Vec<String> = controller
            .session()
            .candidates()
            .iter()
            .take(render::MAX_LISTED)
            .map(|c| format!("{} ({}%)", c.name, c.percent()))
            .collect();
        if items.is_empty() {
            return Ok(());
        }
        let language_index = items.len();
        items.push(render::render_language_toggle(
            controller.session().language(),
            other_language(controller),
        ));
        items.push("終了".to_string());

        let choice = Select::new()
            .with_prompt("候補を選択")
            .items(&items)
            .default(controller.session().selected_index().unwrap_or(0))
            .interact()?;

        if choice == language_index {
            // 以降の選択から新しい言語で取得する
            let next = other_language(controller);
            controller.set_language(next);
            println!("✔ 表示言語: {}", next);
            continue;
        }
        if choice > language_index {
            return Ok(());
        }

        controller.select(choice)?;
        controller.settle().await;
        println!("{}", render::render_session(controller.session()));
    }
}

fn other_language(controller: &Controller) -> Language {
    match controller.session().language() {
        Language::Hebrew => Language::Arabic,
        Language::Arabic => Language::Hebrew,
    }
}

fn print_config(config: &Config) -> anyhow::Result<()> {
    let credentials = config.credentials();
    let state = |key: &Option<String>| if key.is_some() { "設定済み" } else { "未設定" };

    println!("設定 ({}):", Config::config_path()?.display());
    println!("  Plant.id APIキー: {}", state(&credentials.plant_id));
    println!("  Perenual APIキー: {}", state(&credentials.perenual));
    println!("  表示言語: {}", config.language);
    println!("  最大画像サイズ: {}px", config.max_image_size);
    println!("  タイムアウト: {}秒", config.timeout_seconds);
    println!("  位置情報タイムアウト: {}ms", config.geolocation_timeout_ms);
    println!("  最上位候補の自動補完: {}", config.auto_enrich_top);
    Ok(())
}
