//! 位置情報ヒント
//!
//! 識別精度を上げるためのベストエフォートな座標取得。
//! 失敗・タイムアウトは「位置なし」として扱い、エラーにはしない。

use crate::error::Result;
use async_trait::async_trait;
use plant_care_common::Coordinates;
use std::time::Duration;

#[async_trait]
pub trait LocationSource: Send + Sync {
    fn name(&self) -> &'static str;

    async fn locate(&self) -> Result<Option<Coordinates>>;
}

/// コマンドラインで指定された座標
pub struct FixedLocation(pub Coordinates);

#[async_trait]
impl LocationSource for FixedLocation {
    fn name(&self) -> &'static str {
        "fixed"
    }

    async fn locate(&self) -> Result<Option<Coordinates>> {
        Ok(Some(self.0))
    }
}

/// 写真のEXIF GPSタグ
pub struct ExifLocation(pub Option<Coordinates>);

#[async_trait]
impl LocationSource for ExifLocation {
    fn name(&self) -> &'static str {
        "exif"
    }

    async fn locate(&self) -> Result<Option<Coordinates>> {
        Ok(self.0)
    }
}

/// ソースを順に試し、最初に得られた座標を返す
///
/// 全体の待ち時間は `wait` で打ち切る。
pub async fn acquire_hint(
    sources: &[Box<dyn LocationSource>],
    wait: Duration,
) -> Option<Coordinates> {
    let search = async {
        for source in sources {
            match source.locate().await {
                Ok(Some(coordinates)) => {
                    tracing::debug!(source = source.name(), ?coordinates, "location hint acquired");
                    return Some(coordinates);
                }
                Ok(None) => {}
                Err(e) => {
                    tracing::debug!(source = source.name(), error = %e, "location source failed");
                }
            }
        }
        None
    };

    match tokio::time::timeout(wait, search).await {
        Ok(found) => found,
        Err(_) => {
            tracing::debug!(?wait, "location hint timed out");
            None
        }
    }
}
