use serde_json::Value;

use super::asset;
use super::json;
use crate::assets::AssetStore;
use crate::error::{ConvertError, Result};
use crate::xml::Element;

#[derive(Debug, Clone, PartialEq)]
pub struct Sound {
    pub name: String,
    pub file_name: String,
    /// `data:` URL, filled in by [`Sound::load`].
    pub audio: Option<String>,
}

impl Sound {
    pub fn read_sb2(value: &Value) -> Result<Self> {
        let obj = value
            .as_object()
            .ok_or_else(|| ConvertError::sb2(format!("sound must be an object, got {value}")))?;
        let md5 = json::string(obj, "md5").ok_or_else(|| ConvertError::sb2("sound without md5"))?;
        let id = obj.get("soundID").and_then(Value::as_i64);
        Ok(Self {
            name: json::string(obj, "soundName").unwrap_or_default().to_string(),
            file_name: asset::sb2_file_name(md5, id),
            audio: None,
        })
    }

    pub fn read_sb3(value: &Value) -> Result<Self> {
        let obj = value
            .as_object()
            .ok_or_else(|| ConvertError::sb3(format!("sound must be an object, got {value}")))?;
        let file_name = match json::string(obj, "md5ext") {
            Some(md5ext) => md5ext.to_string(),
            None => {
                let id = json::string(obj, "assetId")
                    .ok_or_else(|| ConvertError::sb3("sound without md5ext or assetId"))?;
                format!("{id}.{}", json::string(obj, "dataFormat").unwrap_or("wav"))
            }
        };
        Ok(Self {
            name: json::string(obj, "name").unwrap_or_default().to_string(),
            file_name,
            audio: None,
        })
    }

    pub async fn load(&mut self, store: &AssetStore) -> Result<()> {
        let bytes = store.fetch_file(&self.file_name).await?;
        tracing::debug!(sound = %self.name, file = %self.file_name, bytes = bytes.len(), "sound loaded");
        self.audio = Some(asset::data_url(&self.file_name, &bytes));
        Ok(())
    }

    pub fn to_xml(&self) -> Element {
        Element::new("sound")
            .attr("name", self.name.as_str())
            .attr_opt("sound", self.audio.as_deref())
    }
}
