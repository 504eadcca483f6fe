//! Tests for the clip generator against a mock sound-generation endpoint.

use async_trait::async_trait;
use serde_json::json;
use sonance_clipgen::{
    ClipError, ClipGenerator, ClipGeneratorConfig, ClipStatus, PromptList, PromptSpec,
};
use sonance_transcode::{AudioFormat, BridgeError, FormatBridge};
use std::path::Path;
use std::sync::Mutex;
use wiremock::matchers::{body_json, header, method, path, query_param};
use wiremock::{Mock, MockServer, ResponseTemplate};

const FAKE_MP3: &[u8] = b"ID3\x03\x00fake mp3 payload";

/// Bridge that copies the input and records each call
#[derive(Default)]
struct CopyBridge {
    calls: Mutex<Vec<(String, AudioFormat)>>,
}

#[async_trait]
impl FormatBridge for CopyBridge {
    async fn transcode(
        &self,
        input: &Path,
        output: &Path,
        format: AudioFormat,
    ) -> sonance_transcode::Result<()> {
        self.calls
            .lock()
            .unwrap()
            .push((input.file_name().unwrap().to_string_lossy().into_owned(), format));
        tokio::fs::copy(input, output).await?;
        Ok(())
    }
}

/// Bridge standing in for a missing encoder
struct MissingBridge;

#[async_trait]
impl FormatBridge for MissingBridge {
    async fn transcode(&self, _: &Path, _: &Path, _: AudioFormat) -> sonance_transcode::Result<()> {
        Err(BridgeError::Unavailable("ffmpeg: not found".into()))
    }
}

fn prompt(name: &str, text: &str) -> PromptSpec {
    PromptSpec {
        name: name.to_string(),
        text: text.to_string(),
        duration_seconds: 10.0,
        prompt_influence: 0.3,
    }
}

fn config_for(server: &MockServer, output_dir: &Path) -> ClipGeneratorConfig {
    ClipGeneratorConfig::new("test-key")
        .with_endpoint(format!("{}/v1/sound-generation", server.uri()))
        .with_output_dir(output_dir)
}

// =============================================================================
// Construction
// =============================================================================

mod construction {
    use super::*;

    #[test]
    fn test_empty_api_key_is_fatal() {
        let result = ClipGenerator::new(ClipGeneratorConfig::new(""), CopyBridge::default());
        match result {
            Err(ClipError::Config(msg)) => assert!(msg.contains("API key")),
            Err(e) => panic!("Expected Config error, got {}", e),
            Ok(_) => panic!("Expected Config error"),
        }
    }

    #[test]
    fn test_valid_config_accepted() {
        let config = ClipGeneratorConfig::new("key").with_endpoint("http://localhost:9999/gen");
        assert!(ClipGenerator::new(config, CopyBridge::default()).is_ok());
    }
}

// =============================================================================
// Generation
// =============================================================================

mod generation {
    use super::*;

    #[tokio::test]
    async fn test_successful_prompt_saves_and_converts() {
        let server = MockServer::start().await;
        let dir = tempfile::tempdir().unwrap();

        Mock::given(method("POST"))
            .and(path("/v1/sound-generation"))
            .and(query_param("output_format", "mp3_44100_128"))
            .and(header("xi-api-key", "test-key"))
            .and(body_json(json!({
                "text": "Soft bowed violin note",
                "duration_seconds": 10.0,
                "prompt_influence": 0.3
            })))
            .respond_with(ResponseTemplate::new(200).set_body_bytes(FAKE_MP3))
            .expect(1)
            .mount(&server)
            .await;

        let bridge = CopyBridge::default();
        let generator = ClipGenerator::new(config_for(&server, dir.path()), bridge).unwrap();
        let prompts =
            PromptList::from_prompts(vec![prompt("inhale_violin", "Soft bowed violin note")])
                .unwrap();

        let report = generator.generate(&prompts).await;

        assert_eq!(report.saved(), 1);
        assert_eq!(report.converted(), 1);
        assert_eq!(report.failed(), 0);

        let mp3 = dir.path().join("inhale_violin.mp3");
        let wav = dir.path().join("inhale_violin.wav");
        assert_eq!(std::fs::read(&mp3).unwrap(), FAKE_MP3);
        assert!(wav.exists());

        match &report.outcomes[0].status {
            ClipStatus::Converted { source, wav: out } => {
                assert_eq!(source, &mp3);
                assert_eq!(out, &wav);
            }
            other => panic!("Expected Converted, got {:?}", other),
        }
    }

    #[tokio::test]
    async fn test_bridge_receives_wav_target() {
        let server = MockServer::start().await;
        let dir = tempfile::tempdir().unwrap();

        Mock::given(method("POST"))
            .respond_with(ResponseTemplate::new(200).set_body_bytes(FAKE_MP3))
            .mount(&server)
            .await;

        let generator =
            ClipGenerator::new(config_for(&server, dir.path()), CopyBridge::default()).unwrap();
        let prompts = PromptList::from_prompts(vec![prompt("chime", "Glass chime")]).unwrap();
        generator.generate(&prompts).await;

        let calls = generator.bridge().calls.lock().unwrap();
        assert_eq!(calls.as_slice(), &[("chime.mp3".to_string(), AudioFormat::Wav)]);
        assert!(dir.path().join("chime.wav").exists());
    }

    #[tokio::test]
    async fn test_api_error_is_recorded_and_run_continues() {
        let server = MockServer::start().await;
        let dir = tempfile::tempdir().unwrap();

        Mock::given(method("POST"))
            .and(body_json(json!({
                "text": "first",
                "duration_seconds": 10.0,
                "prompt_influence": 0.3
            })))
            .respond_with(ResponseTemplate::new(422).set_body_string("duration too long"))
            .mount(&server)
            .await;

        Mock::given(method("POST"))
            .and(body_json(json!({
                "text": "second",
                "duration_seconds": 10.0,
                "prompt_influence": 0.3
            })))
            .respond_with(ResponseTemplate::new(200).set_body_bytes(FAKE_MP3))
            .mount(&server)
            .await;

        let generator =
            ClipGenerator::new(config_for(&server, dir.path()), CopyBridge::default()).unwrap();
        let prompts =
            PromptList::from_prompts(vec![prompt("one", "first"), prompt("two", "second")])
                .unwrap();

        let report = generator.generate(&prompts).await;

        assert_eq!(report.outcomes.len(), 2);
        assert_eq!(report.failed(), 1);
        assert_eq!(report.converted(), 1);

        match &report.outcomes[0].status {
            ClipStatus::Failed(ClipError::Api { status, body }) => {
                assert_eq!(*status, 422);
                assert_eq!(body, "duration too long");
            }
            other => panic!("Expected Api error, got {:?}", other),
        }
        assert!(!dir.path().join("one.mp3").exists());
        assert!(dir.path().join("two.mp3").exists());
    }

    #[tokio::test]
    async fn test_missing_encoder_keeps_compressed_clip() {
        let server = MockServer::start().await;
        let dir = tempfile::tempdir().unwrap();

        Mock::given(method("POST"))
            .respond_with(ResponseTemplate::new(200).set_body_bytes(FAKE_MP3))
            .mount(&server)
            .await;

        let generator = ClipGenerator::new(config_for(&server, dir.path()), MissingBridge).unwrap();
        let prompts = PromptList::from_prompts(vec![prompt("exhale", "Violin decay")]).unwrap();

        let report = generator.generate(&prompts).await;

        assert_eq!(report.saved(), 1);
        assert_eq!(report.converted(), 0);
        assert_eq!(report.failed(), 0);
        assert!(matches!(
            report.outcomes[0].status,
            ClipStatus::SavedOnly {
                error: BridgeError::Unavailable(_),
                ..
            }
        ));
        assert!(dir.path().join("exhale.mp3").exists());
        assert!(!dir.path().join("exhale.wav").exists());
    }

    #[tokio::test]
    async fn test_unreachable_endpoint_fails_each_prompt() {
        let dir = tempfile::tempdir().unwrap();

        // Nothing listens on port 1
        let config = ClipGeneratorConfig::new("key")
            .with_endpoint("http://127.0.0.1:1/v1/sound-generation")
            .with_output_dir(dir.path());
        let generator = ClipGenerator::new(config, CopyBridge::default()).unwrap();
        let prompts =
            PromptList::from_prompts(vec![prompt("a", "one"), prompt("b", "two")]).unwrap();

        let report = generator.generate(&prompts).await;

        assert_eq!(report.failed(), 2);
        for outcome in &report.outcomes {
            assert!(matches!(
                outcome.status,
                ClipStatus::Failed(ClipError::Request(_))
            ));
        }
    }

    #[tokio::test]
    async fn test_output_dir_is_created() {
        let server = MockServer::start().await;
        let dir = tempfile::tempdir().unwrap();
        let nested = dir.path().join("clips").join("breath");

        Mock::given(method("POST"))
            .respond_with(ResponseTemplate::new(200).set_body_bytes(FAKE_MP3))
            .mount(&server)
            .await;

        let generator =
            ClipGenerator::new(config_for(&server, &nested), CopyBridge::default()).unwrap();
        let prompts = PromptList::from_prompts(vec![prompt("in", "Inhale")]).unwrap();

        let report = generator.generate(&prompts).await;
        assert_eq!(report.converted(), 1);
        assert!(nested.join("in.wav").exists());
    }

    #[tokio::test]
    async fn test_empty_prompt_list_sends_nothing() {
        let server = MockServer::start().await;
        let dir = tempfile::tempdir().unwrap();

        Mock::given(method("POST"))
            .respond_with(ResponseTemplate::new(200))
            .expect(0)
            .mount(&server)
            .await;

        let generator =
            ClipGenerator::new(config_for(&server, dir.path()), CopyBridge::default()).unwrap();
        let report = generator.generate(&PromptList::default()).await;
        assert!(report.outcomes.is_empty());
    }
}
