//! Hand descriptors and their execution.

use std::collections::BTreeMap;

use async_trait::async_trait;
use reqwest::Url;
use serde::{Deserialize, Serialize};
use serde_json::json;
use tracing::{debug, instrument};

use crate::error::{HandError, Result};
use crate::param::{ParamDestination, ParamInfo, ParamValue, Params};
use crate::template;

/// Full hand description as written in the descriptions file.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct HandDescriptor {
    #[serde(default, alias = "url_name")]
    pub name: String,
    #[serde(alias = "URL_template")]
    pub url_template: String,
    #[serde(default)]
    pub body: String,
    #[serde(default, alias = "params")]
    pub parameters: BTreeMap<String, ParamInfo>,
    #[serde(default)]
    pub help: String,
}

impl HandDescriptor {
    /// Name, URL template and every parameter's help in name order.
    pub fn help_text(&self) -> String {
        let mut out = format!("Name: {}\n", self.name);
        if !self.help.is_empty() {
            out.push_str(&format!("{}\n", self.help));
        }
        out.push_str(&format!("URL template: {}\n", self.url_template));
        out.push_str("Parameters:\n");
        for param in self.parameters.values() {
            out.push_str(&param.help_text());
        }
        out
    }

    /// One entry of the common help listing.
    pub fn brief(&self) -> String {
        if self.help.is_empty() {
            format!("{}\n", self.name)
        } else {
            format!("{}\n\t{}\n", self.name, self.help)
        }
    }

    /// Collected values plus defaults for every parameter that was not supplied.
    pub fn values_with_defaults(&self, params: &Params) -> Params {
        let mut values = params.clone();
        for (name, info) in &self.parameters {
            if let Some(default) = &info.default_value {
                values
                    .entry(name.clone())
                    .or_insert_with(|| default.clone());
            }
        }
        values
    }
}

/// Descriptor-side contract used by the session engine.
#[async_trait]
pub trait HandProcessor: Send + Sync {
    fn descriptor(&self) -> &HandDescriptor;

    fn name(&self) -> &str {
        &self.descriptor().name
    }

    fn params(&self) -> &BTreeMap<String, ParamInfo> {
        &self.descriptor().parameters
    }

    fn param(&self, name: &str) -> Result<&ParamInfo> {
        self.params()
            .get(name)
            .ok_or_else(|| HandError::UnknownParam(name.to_string()))
    }

    /// Parameters that must be supplied before the hand can run, in name order.
    fn required_params(&self) -> Vec<&ParamInfo> {
        self.params().values().filter(|p| p.is_required()).collect()
    }

    fn help(&self) -> String {
        self.descriptor().help_text()
    }

    /// Parses one `name value` row (fields separated by whitespace) with that parameter's parser.
    fn parse_row(&self, row: &str) -> Result<(String, ParamValue)> {
        let fields: Vec<&str> = row.split_whitespace().collect();
        if fields.len() != 2 {
            return Err(HandError::MalformedRow {
                row: row.to_string(),
                fields: fields.len(),
            });
        }
        let value = self.param(fields[0])?.parse_value(fields[1])?;
        Ok((fields[0].to_string(), value))
    }

    /// Executes the hand with the collected params and returns the rendered response.
    async fn process(&self, params: &Params) -> Result<String>;
}

/// Hand executed as an HTTP GET against its URL template.
pub struct HttpHand {
    descriptor: HandDescriptor,
    client: reqwest::Client,
}

impl HttpHand {
    pub fn new(descriptor: HandDescriptor, client: reqwest::Client) -> Self {
        Self { descriptor, client }
    }

    fn build_url(&self, values: &Params) -> Result<Url> {
        let rendered = template::render(&self.descriptor.url_template, values)?;
        let mut url = Url::parse(&rendered).map_err(|e| HandError::InvalidUrl {
            url: rendered.clone(),
            reason: e.to_string(),
        })?;

        let query: Vec<(&str, String)> = self
            .descriptor
            .parameters
            .iter()
            .filter(|(_, info)| info.destination == ParamDestination::QueryPlaced)
            .filter_map(|(name, _)| values.get(name).map(|v| (name.as_str(), v.to_string())))
            .collect();
        if !query.is_empty() {
            url.query_pairs_mut().extend_pairs(query);
        }
        Ok(url)
    }
}

#[async_trait]
impl HandProcessor for HttpHand {
    fn descriptor(&self) -> &HandDescriptor {
        &self.descriptor
    }

    #[instrument(skip(self, params), fields(hand = %self.descriptor.name))]
    async fn process(&self, params: &Params) -> Result<String> {
        let values = self.descriptor.values_with_defaults(params);
        let url = self.build_url(&values)?;
        debug!(url = %url, "Requesting hand");

        let response = self.client.get(url.clone()).send().await?;
        let status = response.status();
        let data: serde_json::Value = response
            .json()
            .await
            .map_err(|e| HandError::Decode(e.to_string()))?;
        debug!(status = %status, "Hand responded");

        let context = json!({
            "response": data,
            "meta": {
                "url": url.as_str(),
                "params": values,
            },
        });
        template::render(&self.descriptor.body, &context)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::param::ParamType;
    use mockito::Matcher;

    fn descriptor(base_url: &str) -> HandDescriptor {
        let mut parameters = BTreeMap::new();
        parameters.insert(
            "user".to_string(),
            ParamInfo {
                name: "user".to_string(),
                help: "user id".to_string(),
                destination: ParamDestination::UrlPlaced,
                param_type: ParamType::Integer,
                optional: false,
                default_value: None,
            },
        );
        parameters.insert(
            "fields".to_string(),
            ParamInfo {
                name: "fields".to_string(),
                help: "fields to return".to_string(),
                destination: ParamDestination::QueryPlaced,
                param_type: ParamType::String,
                optional: true,
                default_value: Some(ParamValue::String("all".to_string())),
            },
        );
        parameters.insert(
            "verbose".to_string(),
            ParamInfo {
                name: "verbose".to_string(),
                help: String::new(),
                destination: ParamDestination::QueryPlaced,
                param_type: ParamType::Integer,
                optional: true,
                default_value: None,
            },
        );
        HandDescriptor {
            name: "user".to_string(),
            url_template: format!("{}/users/{{{{user}}}}", base_url),
            body: "{{response.name}} ({{meta.params.user}})".to_string(),
            parameters,
            help: "Shows a user".to_string(),
        }
    }

    fn params(pairs: &[(&str, ParamValue)]) -> Params {
        pairs
            .iter()
            .map(|(k, v)| (k.to_string(), v.clone()))
            .collect()
    }

    #[test]
    fn test_required_params_and_lookup() {
        let hand = HttpHand::new(descriptor("http://localhost"), reqwest::Client::new());
        let required: Vec<&str> = hand.required_params().iter().map(|p| p.name.as_str()).collect();
        assert_eq!(required, vec!["user"]);
        assert!(hand.param("user").is_ok());
        assert!(matches!(hand.param("nope"), Err(HandError::UnknownParam(_))));
    }

    #[test]
    fn test_parse_row() {
        let hand = HttpHand::new(descriptor("http://localhost"), reqwest::Client::new());
        assert_eq!(
            hand.parse_row("  user   7 ").unwrap(),
            ("user".to_string(), ParamValue::Integer(7))
        );
        assert!(matches!(
            hand.parse_row("user"),
            Err(HandError::MalformedRow { fields: 1, .. })
        ));
        assert!(matches!(
            hand.parse_row("user 7 8"),
            Err(HandError::MalformedRow { fields: 3, .. })
        ));
        assert!(matches!(hand.parse_row("other 7"), Err(HandError::UnknownParam(_))));
        assert!(matches!(hand.parse_row("user x"), Err(HandError::InvalidValue { .. })));
    }

    #[test]
    fn test_build_url_applies_defaults_and_query() {
        let hand = HttpHand::new(descriptor("http://localhost"), reqwest::Client::new());
        let values = hand
            .descriptor()
            .values_with_defaults(&params(&[("user", ParamValue::Integer(7))]));
        let url = hand.build_url(&values).unwrap();
        assert_eq!(url.as_str(), "http://localhost/users/7?fields=all");
    }

    #[test]
    fn test_build_url_missing_url_param_is_error() {
        let hand = HttpHand::new(descriptor("http://localhost"), reqwest::Client::new());
        assert!(matches!(
            hand.build_url(&Params::new()),
            Err(HandError::Template(_))
        ));
    }

    #[test]
    fn test_help_text_lists_params_in_order() {
        let help = descriptor("http://h").help_text();
        assert!(help.starts_with("Name: user\nShows a user\nURL template: http://h/users/{{user}}\nParameters:\n"));
        let fields = help.find("fields(String)").unwrap();
        let user = help.find("user(Integer)").unwrap();
        let verbose = help.find("verbose(Integer)").unwrap();
        assert!(fields < user && user < verbose);
    }

    #[tokio::test]
    async fn test_process_renders_response() {
        let mut server = mockito::Server::new_async().await;
        let mock = server
            .mock("GET", "/users/7")
            .match_query(Matcher::AllOf(vec![
                Matcher::UrlEncoded("fields".into(), "name".into()),
                Matcher::UrlEncoded("verbose".into(), "1".into()),
            ]))
            .with_status(200)
            .with_header("content-type", "application/json")
            .with_body(r#"{"name": "Alice"}"#)
            .create_async()
            .await;

        let hand = HttpHand::new(descriptor(&server.url()), reqwest::Client::new());
        let out = hand
            .process(&params(&[
                ("user", ParamValue::Integer(7)),
                ("fields", ParamValue::String("name".to_string())),
                ("verbose", ParamValue::Integer(1)),
            ]))
            .await
            .unwrap();

        assert_eq!(out, "Alice (7)");
        mock.assert_async().await;
    }

    #[tokio::test]
    async fn test_process_non_json_response_is_decode_error() {
        let mut server = mockito::Server::new_async().await;
        let _mock = server
            .mock("GET", "/users/1")
            .match_query(Matcher::Any)
            .with_status(200)
            .with_body("not json")
            .create_async()
            .await;

        let hand = HttpHand::new(descriptor(&server.url()), reqwest::Client::new());
        let result = hand.process(&params(&[("user", ParamValue::Integer(1))])).await;
        assert!(matches!(result, Err(HandError::Decode(_))));
    }
}
