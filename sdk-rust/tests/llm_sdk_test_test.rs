use easeai_sdk::{
    llm_sdk_test::{MockGenerateResult, MockLanguageModel},
    LanguageModel, LanguageModelError, LanguageModelInput, ModelResponse, Part,
};

#[tokio::test]
async fn mock_language_model_tracks_generate_inputs_and_returns_results() {
    let model = MockLanguageModel::new();

    let response1 = ModelResponse {
        content: vec![Part::text("Hello, world!")],
        ..ModelResponse::default()
    };
    let response3 = ModelResponse {
        content: vec![Part::text("Goodbye, world!")],
        ..ModelResponse::default()
    };

    model
        .enqueue_generate(response1.clone())
        .enqueue_generate(MockGenerateResult::error(LanguageModelError::InvalidInput(
            "generate error".to_string(),
        )))
        .enqueue_generate(response3.clone());

    let input1 = LanguageModelInput::from_prompt("Hi");
    let res1 = model
        .generate(input1.clone())
        .await
        .expect("first generate should succeed");
    assert_eq!(res1, response1);
    let tracked = model.tracked_generate_inputs();
    assert_eq!(tracked.len(), 1);
    assert_eq!(tracked[0].messages, input1.messages.clone());

    let input2 = LanguageModelInput::from_prompt("Error");
    let err = model
        .generate(input2.clone())
        .await
        .expect_err("second generate should error");
    match err {
        LanguageModelError::InvalidInput(msg) => {
            assert_eq!(msg, "generate error");
        }
        other => panic!("unexpected error variant: {:?}", other),
    }
    assert_eq!(model.generate_call_count(), 2);

    let input3 = LanguageModelInput::from_prompt("Goodbye");
    let res3 = model
        .generate(input3.clone())
        .await
        .expect("third generate should succeed");
    assert_eq!(res3, response3);
    let tracked = model.tracked_generate_inputs();
    assert_eq!(tracked.len(), 3);
    assert_eq!(tracked[2].messages, input3.messages.clone());

    model.reset();
    assert!(model.tracked_generate_inputs().is_empty());

    model.enqueue_generate(MockGenerateResult::text("After reset"));

    model.restore();
    assert!(model.tracked_generate_inputs().is_empty());

    let err = model
        .generate(input1.clone())
        .await
        .expect_err("generate after restore should fail");
    match err {
        LanguageModelError::Invariant(provider, message) => {
            assert_eq!(provider, "mock");
            assert_eq!(message, "no mocked generate results available");
        }
        other => panic!("unexpected error variant: {:?}", other),
    }
}

#[tokio::test]
async fn mock_language_model_responds_from_input() {
    let model = MockLanguageModel::new();
    model.enqueue_generate(MockGenerateResult::respond(|input| {
        Ok(ModelResponse {
            content: vec![Part::text(input.user_text().to_uppercase())],
            ..ModelResponse::default()
        })
    }));

    let response = model
        .generate(LanguageModelInput::from_prompt("echo me"))
        .await
        .expect("generate should succeed");

    assert_eq!(response.text(), "ECHO ME");
    assert_eq!(model.generate_call_count(), 1);
}
