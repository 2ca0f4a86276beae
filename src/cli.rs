use clap::{Parser, Subcommand};
use plant_care_common::Language;
use std::path::PathBuf;

#[derive(Parser)]
#[command(name = "plant-care")]
#[command(about = "植物写真の識別と育て方ガイド", long_about = None)]
pub struct Cli {
    #[command(subcommand)]
    pub command: Commands,

    /// 詳細ログを出力
    #[arg(short, long, global = true)]
    pub verbose: bool,
}

#[derive(Subcommand)]
pub enum Commands {
    /// 写真から植物を識別し、育て方を表示
    Identify {
        /// 写真ファイルのパス
        #[arg(required = true)]
        image: PathBuf,

        /// 表示言語 (he/ar)
        #[arg(short, long)]
        lang: Option<Language>,

        /// 緯度（--lon と併用）
        #[arg(long, requires = "lon", allow_negative_numbers = true)]
        lat: Option<f64>,

        /// 経度（--lat と併用）
        #[arg(long, requires = "lat", allow_negative_numbers = true)]
        lon: Option<f64>,

        /// EXIFのGPS情報を使わない
        #[arg(long)]
        no_exif_location: bool,

        /// 補完する候補の番号（1始まり）
        #[arg(short, long, value_parser = clap::value_parser!(u64).range(1..))]
        select: Option<u64>,

        /// 候補を対話的に選び直す
        #[arg(short, long)]
        interactive: bool,

        /// 結果をJSONで出力
        #[arg(long)]
        json: bool,
    },

    /// 学名から育て方を表示（識別なし）
    Care {
        /// 学名（例: "Ficus carica"）
        #[arg(required = true)]
        name: String,

        /// 表示言語 (he/ar)
        #[arg(short, long)]
        lang: Option<Language>,
    },

    /// 設定を表示/編集
    Config {
        /// Plant.id APIキーを設定
        #[arg(long)]
        set_plant_id_key: Option<String>,

        /// Perenual APIキーを設定
        #[arg(long)]
        set_perenual_key: Option<String>,

        /// 既定の表示言語を設定 (he/ar)
        #[arg(long)]
        set_language: Option<Language>,

        /// 最上位候補の自動補完 (true/false)
        #[arg(long)]
        set_auto_enrich: Option<bool>,

        /// 設定を表示
        #[arg(long)]
        show: bool,
    },
}
