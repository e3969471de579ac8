// src/push.rs

use anyhow::{bail, Context, Result};
use reqwest::Client;
use serde::{Deserialize, Serialize};
use tracing::{info, instrument};
use url::Url;

/// Body accepted by the sheet's write endpoint.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct StatusUpdate {
    pub event: String,
    pub heat: String,
}

#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum WriteStatus {
    Success,
    Error,
}

/// Reply from the write endpoint.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct WriteResponse {
    pub status: WriteStatus,
    pub message: String,
}

impl WriteResponse {
    /// Turn an endpoint-reported failure into an error.
    pub fn into_result(self) -> Result<String> {
        match self.status {
            WriteStatus::Success => Ok(self.message),
            WriteStatus::Error => bail!("write endpoint reported error: {}", self.message),
        }
    }
}

/// POST `update` to the write endpoint. The endpoint stamps the time itself.
#[instrument(level = "info", skip_all, fields(endpoint = %endpoint))]
pub async fn push_status(client: &Client, endpoint: &Url, update: &StatusUpdate) -> Result<String> {
    let response: WriteResponse = client
        .post(endpoint.clone())
        .json(update)
        .send()
        .await
        .with_context(|| format!("POST {} failed", endpoint))?
        .error_for_status()
        .with_context(|| format!("Non-success status {}", endpoint))?
        .json()
        .await
        .with_context(|| format!("Decoding reply from {}", endpoint))?;

    let message = response.into_result()?;
    info!(event = %update.event, heat = %update.heat, %message, "status pushed");
    Ok(message)
}

#[cfg(test)]
mod tests {
    use super::*;
    use tokio::{
        io::{AsyncReadExt, AsyncWriteExt},
        net::TcpListener,
    };

    #[test]
    fn update_serialises_as_expected() -> Result<()> {
        let body = serde_json::to_string(&StatusUpdate {
            event: "Event 12".into(),
            heat: "Heat 3".into(),
        })?;
        assert_eq!(body, r#"{"event":"Event 12","heat":"Heat 3"}"#);
        Ok(())
    }

    #[test]
    fn error_reply_is_an_error() -> Result<()> {
        let reply: WriteResponse =
            serde_json::from_str(r#"{"status":"error","message":"TypeError: bad input"}"#)?;
        let err = reply.into_result().unwrap_err();
        assert!(err.to_string().contains("TypeError: bad input"));

        let ok: WriteResponse =
            serde_json::from_str(r#"{"status":"success","message":"Sheet updated successfully."}"#)?;
        assert_eq!(ok.into_result()?, "Sheet updated successfully.");
        Ok(())
    }

    #[tokio::test]
    async fn push_posts_json_and_reads_reply() -> Result<()> {
        let listener = TcpListener::bind("127.0.0.1:0").await?;
        let addr = listener.local_addr()?;
        let server = tokio::spawn(async move {
            let (mut sock, _) = listener.accept().await?;
            let mut request = Vec::new();
            let mut buf = [0u8; 1024];
            // read until the JSON body has arrived
            while !String::from_utf8_lossy(&request).contains("\"heat\"") {
                let n = sock.read(&mut buf).await?;
                if n == 0 {
                    break;
                }
                request.extend_from_slice(&buf[..n]);
            }
            let body = r#"{"status":"success","message":"Sheet updated successfully."}"#;
            let response = format!(
                "HTTP/1.1 200 OK\r\nContent-Type: application/json\r\nContent-Length: {}\r\nConnection: close\r\n\r\n{}",
                body.len(),
                body
            );
            sock.write_all(response.as_bytes()).await?;
            sock.shutdown().await?;
            Ok::<_, anyhow::Error>(String::from_utf8_lossy(&request).to_string())
        });

        let endpoint = Url::parse(&format!("http://{}/exec", addr))?;
        let update = StatusUpdate {
            event: "4".into(),
            heat: "2".into(),
        };
        let message = push_status(&Client::new(), &endpoint, &update).await?;
        assert_eq!(message, "Sheet updated successfully.");

        let request = server.await??;
        assert!(request.starts_with("POST /exec"));
        assert!(request.contains(r#"{"event":"4","heat":"2"}"#));
        Ok(())
    }
}
