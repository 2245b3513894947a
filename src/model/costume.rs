use serde_json::Value;

use super::asset;
use super::json;
use crate::assets::AssetStore;
use crate::error::{ConvertError, Result};
use crate::xml::Element;

#[derive(Debug, Clone, PartialEq)]
pub struct Costume {
    pub name: String,
    /// Name the asset store knows the image by.
    pub file_name: String,
    pub center_x: f64,
    pub center_y: f64,
    /// `data:` URL, filled in by [`Costume::load`].
    pub image: Option<String>,
}

impl Costume {
    pub fn read_sb2(value: &Value) -> Result<Self> {
        let obj = value
            .as_object()
            .ok_or_else(|| ConvertError::sb2(format!("costume must be an object, got {value}")))?;
        let md5 = json::string(obj, "baseLayerMD5")
            .ok_or_else(|| ConvertError::sb2("costume without baseLayerMD5"))?;
        let id = obj.get("baseLayerID").and_then(Value::as_i64);
        let resolution = resolution(json::number(obj, "bitmapResolution"));

        Ok(Self {
            name: json::string(obj, "costumeName").unwrap_or_default().to_string(),
            file_name: asset::sb2_file_name(md5, id),
            center_x: json::number_or(obj, "rotationCenterX", 0.0) / resolution,
            center_y: json::number_or(obj, "rotationCenterY", 0.0) / resolution,
            image: None,
        })
    }

    pub fn read_sb3(value: &Value) -> Result<Self> {
        let obj = value
            .as_object()
            .ok_or_else(|| ConvertError::sb3(format!("costume must be an object, got {value}")))?;
        let file_name = match json::string(obj, "md5ext") {
            Some(md5ext) => md5ext.to_string(),
            None => {
                let id = json::string(obj, "assetId")
                    .ok_or_else(|| ConvertError::sb3("costume without md5ext or assetId"))?;
                let format = json::string(obj, "dataFormat").unwrap_or("png");
                format!("{id}.{format}")
            }
        };
        let resolution = resolution(json::number(obj, "bitmapResolution"));

        Ok(Self {
            name: json::string(obj, "name").unwrap_or_default().to_string(),
            file_name,
            center_x: json::number_or(obj, "rotationCenterX", 0.0) / resolution,
            center_y: json::number_or(obj, "rotationCenterY", 0.0) / resolution,
            image: None,
        })
    }

    /// Fetch the image and embed it.
    pub async fn load(&mut self, store: &AssetStore) -> Result<()> {
        let bytes = store.fetch_file(&self.file_name).await?;
        tracing::debug!(costume = %self.name, file = %self.file_name, bytes = bytes.len(), "costume loaded");
        self.image = Some(asset::data_url(&self.file_name, &bytes));
        Ok(())
    }

    pub fn to_xml(&self) -> Element {
        Element::new("costume")
            .attr("name", self.name.as_str())
            .attr("center-x", self.center_x)
            .attr("center-y", self.center_y)
            .attr_opt("image", self.image.as_deref())
    }
}

fn resolution(value: Option<f64>) -> f64 {
    value.filter(|r| *r > 0.0).unwrap_or(1.0)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::assets::ZipIndex;
    use crate::xml::serialize;
    use serde_json::json;
    use std::io::Write;

    fn store_with(name: &str, bytes: &[u8]) -> AssetStore {
        let mut buffer = std::io::Cursor::new(Vec::new());
        {
            let mut writer = ::zip::ZipWriter::new(&mut buffer);
            writer
                .start_file(name, ::zip::write::SimpleFileOptions::default())
                .unwrap();
            writer.write_all(bytes).unwrap();
            writer.finish().unwrap();
        }
        AssetStore::ZipArchive(ZipIndex::from_bytes(&buffer.into_inner()).unwrap())
    }

    #[test]
    fn test_sb2_costume_uses_layer_id_and_resolution() {
        let costume = Costume::read_sb2(&json!({
            "costumeName": "cat",
            "baseLayerID": 3,
            "baseLayerMD5": "09dc888b0b7df19f70d81588ae73420e.svg",
            "bitmapResolution": 2,
            "rotationCenterX": 96,
            "rotationCenterY": 100
        }))
        .unwrap();
        assert_eq!(costume.file_name, "3.svg");
        assert_eq!(costume.center_x, 48.0);
        assert_eq!(costume.center_y, 50.0);
    }

    #[test]
    fn test_sb3_costume_falls_back_to_asset_id() {
        let costume = Costume::read_sb3(&json!({
            "name": "backdrop1",
            "assetId": "cd21514d0531fdffb22204e0ec5ed84a",
            "dataFormat": "svg",
            "rotationCenterX": 240,
            "rotationCenterY": 180
        }))
        .unwrap();
        assert_eq!(costume.file_name, "cd21514d0531fdffb22204e0ec5ed84a.svg");
        assert_eq!(costume.center_x, 240.0);
    }

    #[test]
    fn test_missing_asset_name_is_malformed() {
        assert!(Costume::read_sb3(&json!({"name": "x"})).is_err());
        assert!(Costume::read_sb2(&json!({"costumeName": "x"})).is_err());
    }

    #[tokio::test]
    async fn test_load_embeds_data_url() {
        let store = store_with("a.png", b"PNG");
        let mut costume = Costume::read_sb3(&json!({
            "name": "a", "md5ext": "a.png", "rotationCenterX": 1, "rotationCenterY": 2
        }))
        .unwrap();
        costume.load(&store).await.unwrap();
        assert_eq!(
            serialize(&costume.to_xml()).unwrap(),
            r#"<costume name="a" center-x="1" center-y="2" image="data:image/png;base64,UE5H"/>"#
        );
    }

    #[tokio::test]
    async fn test_load_missing_asset() {
        let store = store_with("a.png", b"PNG");
        let mut costume = Costume::read_sb3(&json!({"name": "b", "md5ext": "b.png"})).unwrap();
        let err = costume.load(&store).await.unwrap_err();
        assert!(matches!(err, ConvertError::AssetNotFound(name) if name == "b.png"));
    }
}
