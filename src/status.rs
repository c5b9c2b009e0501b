// src/status.rs
use serde::{Serialize, Serializer};
use std::fmt;
use std::str::FromStr;

/// Locale used when a status is turned into a human-readable message.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum Locale {
    #[default]
    En,
    Zh,
}

impl FromStr for Locale {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "en" | "en-us" | "en_us" => Ok(Locale::En),
            "zh" | "zh-cn" | "zh_cn" => Ok(Locale::Zh),
            other => Err(format!("unsupported locale '{}'", other)),
        }
    }
}

/// Machine-readable result code carried in the `st` field of every JSON reply.
///
/// Codes are banded by concern: 1xxxx request, 2xxxx I/O and subprocess,
/// 3xxxx storage, 4xxxx missing resources, 5xxxx transport.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum St {
    Ok,
    ParamErr,
    IoErr,
    RpcErr,
    ServerErr,
    CompileTimeout,
    ToolErr,
    DbErr,
    UrlErr,
    NoImage,
    NotFound,
    NetworkErr,
    ReadBodyErr,
}

impl St {
    pub const ALL: [St; 13] = [
        St::Ok,
        St::ParamErr,
        St::IoErr,
        St::RpcErr,
        St::ServerErr,
        St::CompileTimeout,
        St::ToolErr,
        St::DbErr,
        St::UrlErr,
        St::NoImage,
        St::NotFound,
        St::NetworkErr,
        St::ReadBodyErr,
    ];

    pub fn code(self) -> u32 {
        match self {
            St::Ok => 0,
            St::ParamErr => 10001,
            St::IoErr => 20000,
            St::RpcErr => 20001,
            St::ServerErr => 20002,
            St::CompileTimeout => 20003,
            St::ToolErr => 20004,
            St::DbErr => 30000,
            St::UrlErr => 40000,
            St::NoImage => 40001,
            St::NotFound => 40004,
            St::NetworkErr => 50000,
            St::ReadBodyErr => 50001,
        }
    }

    pub fn from_code(code: u32) -> Option<St> {
        St::ALL.into_iter().find(|st| st.code() == code)
    }

    pub fn is_ok(self) -> bool {
        self == St::Ok
    }

    /// Human-readable description. `St::Ok` describes as the empty string.
    pub fn describe(self, locale: Locale) -> &'static str {
        match (self, locale) {
            (St::Ok, _) => "",
            (St::ParamErr, Locale::En) => "invalid parameters",
            (St::ParamErr, Locale::Zh) => "参数错误",
            (St::IoErr, Locale::En) => "file or process I/O failed",
            (St::IoErr, Locale::Zh) => "文件相关错误",
            (St::RpcErr, Locale::En) => "remote call failed",
            (St::RpcErr, Locale::Zh) => "服务器远程调用失败",
            (St::ServerErr, Locale::En) => "internal server error",
            (St::ServerErr, Locale::Zh) => "服务器错误",
            (St::CompileTimeout, Locale::En) => "compilation timed out",
            (St::CompileTimeout, Locale::Zh) => "编译超时",
            (St::ToolErr, Locale::En) => "external tool failed",
            (St::ToolErr, Locale::Zh) => "外部工具执行失败",
            (St::DbErr, Locale::En) => "database error",
            (St::DbErr, Locale::Zh) => "数据库错误",
            (St::UrlErr, Locale::En) => "invalid URL",
            (St::UrlErr, Locale::Zh) => "URL错误",
            (St::NoImage, Locale::En) => "no image content",
            (St::NoImage, Locale::Zh) => "没有图片内容",
            (St::NotFound, Locale::En) => "resource not found",
            (St::NotFound, Locale::Zh) => "资源不存在",
            (St::NetworkErr, Locale::En) => "network error",
            (St::NetworkErr, Locale::Zh) => "网络错误",
            (St::ReadBodyErr, Locale::En) => "failed to read request body",
            (St::ReadBodyErr, Locale::Zh) => "读取body错误",
        }
    }
}

/// Looks up the description of a raw numeric status.
///
/// Panics on a code with no catalog entry: that is a missing entry at
/// development time, not a runtime condition.
pub fn describe_code(code: u32, locale: Locale) -> &'static str {
    match St::from_code(code) {
        Some(st) => st.describe(locale),
        None => panic!("unknown St:{}", code),
    }
}

impl fmt::Display for St {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.code())
    }
}

impl Serialize for St {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.serialize_u32(self.code())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashSet;

    #[test]
    fn every_failure_status_has_a_description() {
        for st in St::ALL.into_iter().filter(|st| !st.is_ok()) {
            assert!(!st.describe(Locale::En).is_empty(), "{:?} has no en text", st);
            assert!(!st.describe(Locale::Zh).is_empty(), "{:?} has no zh text", st);
        }
        assert_eq!(St::Ok.describe(Locale::En), "");
    }

    #[test]
    fn codes_are_unique_and_round_trip() {
        let codes: HashSet<u32> = St::ALL.iter().map(|st| st.code()).collect();
        assert_eq!(codes.len(), St::ALL.len());
        assert_eq!(St::from_code(20000), Some(St::IoErr));
        assert_eq!(St::from_code(10001), Some(St::ParamErr));
    }

    #[test]
    fn serializes_as_bare_integer() {
        assert_eq!(serde_json::to_string(&St::ParamErr).unwrap(), "10001");
    }

    #[test]
    #[should_panic(expected = "unknown St:12345")]
    fn unmapped_code_is_fatal() {
        describe_code(12345, Locale::En);
    }

    #[test]
    fn parses_locales() {
        assert_eq!("zh-CN".parse::<Locale>(), Ok(Locale::Zh));
        assert_eq!("EN".parse::<Locale>(), Ok(Locale::En));
        assert!("fr".parse::<Locale>().is_err());
    }
}
