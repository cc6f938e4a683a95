//! Azure Speech recognition tests against a mock HTTP server

use mockito::Matcher;
use parley::config::SpeechConfig;
use parley::voice::{
    AzureRecognizer, AzureSpeechClient, CancellationReason, NoMatchReason, RecognitionResult,
    Recognizer, Recording,
};
use parley::{Error, Outcome, SpeechCapture};

mod common;
use common::{FixedSource, generate_sine_samples};

const PATH: &str = "/speech/recognition/conversation/cognitiveservices/v1";

fn client(endpoint: &str) -> AzureSpeechClient {
    let config = SpeechConfig::new("test-key", "eastus", "en-US")
        .unwrap()
        .with_endpoint(Some(endpoint.to_string()));
    AzureSpeechClient::new(config).unwrap()
}

fn speech() -> Recording {
    Recording::Speech(generate_sine_samples(440.0, 0.5, 0.3))
}

#[tokio::test]
async fn test_recognize_sends_wav_with_credentials() {
    let mut server = mockito::Server::new_async().await;
    let mock = server
        .mock("POST", PATH)
        .match_query(Matcher::AllOf(vec![
            Matcher::UrlEncoded("language".into(), "en-US".into()),
            Matcher::UrlEncoded("format".into(), "simple".into()),
        ]))
        .match_header("ocp-apim-subscription-key", "test-key")
        .match_header(
            "content-type",
            "audio/wav; codecs=audio/pcm; samplerate=16000",
        )
        .with_status(200)
        .with_header("content-type", "application/json")
        .with_body(
            r#"{"RecognitionStatus":"Success","DisplayText":"What's the weather?","Offset":300000,"Duration":12000000}"#,
        )
        .create_async()
        .await;

    let mut recognizer = AzureRecognizer::new(FixedSource::new(speech()), client(&server.url()));
    let result = recognizer.recognize_once().await;

    mock.assert_async().await;
    assert_eq!(
        result,
        RecognitionResult::RecognizedSpeech {
            text: "What's the weather?".to_string()
        }
    );
}

#[tokio::test]
async fn test_no_match_status() {
    let mut server = mockito::Server::new_async().await;
    let _mock = server
        .mock("POST", PATH)
        .match_query(Matcher::Any)
        .with_status(200)
        .with_body(r#"{"RecognitionStatus":"NoMatch","Offset":0,"Duration":0}"#)
        .create_async()
        .await;

    let mut recognizer = AzureRecognizer::new(FixedSource::new(speech()), client(&server.url()));

    assert_eq!(
        recognizer.recognize_once().await,
        RecognitionResult::NoMatch {
            reason: NoMatchReason::NotRecognized
        }
    );
}

#[tokio::test]
async fn test_unauthorized_cancels_with_error_details() {
    let mut server = mockito::Server::new_async().await;
    let _mock = server
        .mock("POST", PATH)
        .match_query(Matcher::Any)
        .with_status(401)
        .with_body("Access denied due to invalid subscription key")
        .create_async()
        .await;

    let mut recognizer = AzureRecognizer::new(FixedSource::new(speech()), client(&server.url()));

    match recognizer.recognize_once().await {
        RecognitionResult::Canceled {
            reason: CancellationReason::Error,
            error_details: Some(details),
        } => {
            assert!(details.contains("401"), "{details}");
            assert!(details.contains("invalid subscription key"), "{details}");
        }
        other => panic!("expected error cancellation, got {other:?}"),
    }
}

#[tokio::test]
async fn test_client_surfaces_http_error() {
    let mut server = mockito::Server::new_async().await;
    let _mock = server
        .mock("POST", PATH)
        .match_query(Matcher::Any)
        .with_status(500)
        .create_async()
        .await;

    let result = client(&server.url()).recognize(b"RIFF").await;
    assert!(matches!(result, Err(Error::Stt(_))));
}

#[tokio::test]
async fn test_initial_silence_skips_request() {
    let mut server = mockito::Server::new_async().await;
    let mock = server
        .mock("POST", PATH)
        .match_query(Matcher::Any)
        .expect(0)
        .create_async()
        .await;

    let mut recognizer = AzureRecognizer::new(
        FixedSource::new(Recording::InitialSilence),
        client(&server.url()),
    );

    assert_eq!(
        recognizer.recognize_once().await,
        RecognitionResult::NoMatch {
            reason: NoMatchReason::InitialSilenceTimeout
        }
    );
    mock.assert_async().await;
}

#[tokio::test]
async fn test_end_of_stream_cancels_without_details() {
    let server = mockito::Server::new_async().await;
    let mut recognizer = AzureRecognizer::new(
        FixedSource::new(Recording::EndOfStream),
        client(&server.url()),
    );

    assert_eq!(
        recognizer.recognize_once().await,
        RecognitionResult::Canceled {
            reason: CancellationReason::EndOfStream,
            error_details: None,
        }
    );
}

#[tokio::test]
async fn test_broken_device_cancels_with_error() {
    let server = mockito::Server::new_async().await;
    let mut capture = SpeechCapture::new(AzureRecognizer::new(
        FixedSource::broken(),
        client(&server.url()),
    ));

    let mut out = Vec::new();
    let utterance = capture.capture(&mut out).await.unwrap();
    let out = String::from_utf8(out).unwrap();

    assert_eq!(utterance.outcome(), Outcome::Canceled);
    assert!(out.contains("Speech Recognition canceled: CancellationReason.Error"));
    assert!(out.contains("Error details: audio error: no input device available"));
}

#[tokio::test]
async fn test_unreachable_service_cancels() {
    // Port 9 (discard) on localhost is not expected to accept HTTP
    let mut recognizer =
        AzureRecognizer::new(FixedSource::new(speech()), client("http://127.0.0.1:9"));

    assert!(matches!(
        recognizer.recognize_once().await,
        RecognitionResult::Canceled {
            reason: CancellationReason::Error,
            error_details: Some(_),
        }
    ));
}
