// src/models.rs
use serde::{Deserialize, Serialize};

#[derive(Deserialize, Debug, Clone, Default)]
#[serde(rename_all = "camelCase")]
pub struct GenReq {
    #[serde(default)]
    pub code: String,
    #[serde(default)]
    pub compile_options: String,
}

#[derive(Serialize, Debug, Clone, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct GenResp {
    pub exit_code: i32,
    pub file: String,
    pub stdout: String,
    pub stderr: String,
}

#[derive(Deserialize, Debug, Clone, Default)]
#[serde(rename_all = "camelCase")]
pub struct RunReq {
    #[serde(default)]
    pub file: String,
    #[serde(default)]
    pub exec_args: String,
    #[serde(default)]
    pub stdin: String,
}

#[derive(Serialize, Debug, Clone, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct RunResp {
    pub exit_code: i32,
    pub stdout: String,
    pub stderr: String,
}

#[derive(Deserialize, Debug, Clone, Default)]
pub struct VisualReq {
    #[serde(default)]
    pub code: String,
}

#[derive(Serialize, Debug, Clone, PartialEq)]
pub struct VisualResp {
    pub res: String,
}
