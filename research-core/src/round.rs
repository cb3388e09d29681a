//! One submit round: validate, record the question, gather context, ask the model.

use std::sync::Arc;

use ai_llm_service::{ChatCompletion, complete_with_fallback};
use context_extractor::{Upload, extract_context};
use tracing::{info, warn};
use web_augmenter::WebAugmenter;

use crate::{
    api_types::{RoundOutcome, StatusMessage, Submission},
    conversation::Conversation,
    error::RoundError,
    prompt,
};

/// Completion client plus web augmenter, constructed once at startup.
#[derive(Clone)]
pub struct ResearchAssistant {
    completion: Arc<dyn ChatCompletion>,
    web: WebAugmenter,
}

impl ResearchAssistant {
    pub fn new(completion: Arc<dyn ChatCompletion>, web: WebAugmenter) -> Self {
        Self { completion, web }
    }

    /// Whether live web search can be enabled at all.
    pub fn web_available(&self) -> bool {
        self.web.is_available()
    }

    /// Runs one round against `conversation`.
    ///
    /// The user turn is appended right after validation, before any network
    /// call; the assistant turn only once a reply was obtained. A document
    /// that cannot be read degrades to empty context with a warning status,
    /// and a failed search degrades to a diagnostic snippet line.
    ///
    /// # Errors
    /// - [`RoundError::EmptyQuestion`] for blank input (conversation untouched)
    /// - [`RoundError::Completion`] when primary and fallback both fail
    ///   (the user turn stays, no assistant turn is added)
    pub async fn submit(
        &self,
        conversation: &mut Conversation,
        submission: Submission,
    ) -> Result<RoundOutcome, RoundError> {
        let Submission {
            question,
            params,
            use_web,
            upload,
            pasted,
        } = submission;

        if question.trim().is_empty() {
            warn!("empty question submitted; round aborted");
            return Err(RoundError::EmptyQuestion);
        }

        conversation.append_user(question.as_str());
        let mut statuses = Vec::new();

        let context = self.context_for(upload, pasted, &mut statuses).await;

        if use_web && !self.web.is_available() {
            statuses.push(StatusMessage::info(
                "Live web search is not configured; answering without it.",
            ));
        }
        let web = self.web.augment(&question, use_web).await;
        if let Some(failure) = &web.failure {
            statuses.push(StatusMessage::warning(format!("Web search failed: {failure}")));
        }

        let messages = prompt::assemble(&context, &web.text, conversation);
        info!(
            model = %params.model,
            messages = messages.len(),
            context_chars = context.chars().count(),
            web_results = web.results,
            "generating response"
        );

        let reply = match complete_with_fallback(self.completion.as_ref(), &messages, &params).await
        {
            Ok(reply) => reply,
            Err(failure) => {
                warn!(error = %failure, turns = conversation.len(), "round failed; question left unanswered");
                return Err(failure.into());
            }
        };

        if reply.fell_back {
            let reason = reply.primary_error.as_deref().unwrap_or("unknown error");
            statuses.push(StatusMessage::warning(format!(
                "{} failed ({reason}), retried with {}.",
                params.model, reply.model
            )));
        }

        conversation.append_assistant(reply.text.as_str());

        Ok(RoundOutcome {
            reply: reply.text,
            model: reply.model,
            fell_back: reply.fell_back,
            context_chars: context.chars().count(),
            web_results: web.results,
            statuses,
        })
    }

    /// Extracts the context blob; any failure degrades to empty context.
    async fn context_for(
        &self,
        upload: Option<Upload>,
        pasted: Option<String>,
        statuses: &mut Vec<StatusMessage>,
    ) -> String {
        let Some(upload) = upload else {
            // Pasted text never fails.
            return extract_context(None, pasted.as_deref()).unwrap_or_default();
        };

        let name = upload
            .file_name
            .clone()
            .unwrap_or_else(|| "uploaded document".to_string());

        // PDF parsing is CPU-bound; keep it off the async workers.
        let joined = tokio::task::spawn_blocking(move || extract_context(Some(upload), None)).await;

        let err = match joined {
            Ok(Ok(text)) => return text,
            Ok(Err(e)) => e.to_string(),
            Err(e) => format!("extraction task failed: {e}"),
        };
        warn!(file = %name, error = %err, "document could not be read; continuing without context");
        statuses.push(StatusMessage::warning(format!(
            "Could not read {name} ({err}); continuing without document context."
        )));
        String::new()
    }
}

#[cfg(test)]
mod tests {
    use std::{
        future::Future,
        pin::Pin,
        sync::{Arc, Mutex},
    };

    use ai_llm_service::{
        AiLlmError, ChatMessage, CompletionParams, EMPTY_REPLY_PLACEHOLDER, ModelId,
        error_handler::{Provider, ProviderError, ProviderErrorKind},
    };
    use context_extractor::DocumentKind;
    use web_augmenter::{SearchResponse, SearchService, WebSearchError};

    use super::*;
    use crate::conversation::TurnRole;

    /// Completion fake: fails for models in `failing`, otherwise answers `reply`.
    struct FakeCompletion {
        reply: Option<String>,
        failing: Vec<ModelId>,
        seen: Mutex<Vec<(ModelId, Vec<ChatMessage>)>>,
    }

    impl FakeCompletion {
        fn answering(reply: Option<&str>) -> Arc<Self> {
            Self::failing_for(reply, &[])
        }

        fn failing_for(reply: Option<&str>, failing: &[ModelId]) -> Arc<Self> {
            Arc::new(Self {
                reply: reply.map(str::to_string),
                failing: failing.to_vec(),
                seen: Mutex::new(Vec::new()),
            })
        }
    }

    impl ChatCompletion for FakeCompletion {
        fn complete<'a>(
            &'a self,
            messages: &'a [ChatMessage],
            params: &'a CompletionParams,
        ) -> Pin<Box<dyn Future<Output = Result<Option<String>, AiLlmError>> + Send + 'a>>
        {
            self.seen
                .lock()
                .unwrap()
                .push((params.model, messages.to_vec()));
            let out = if self.failing.contains(&params.model) {
                Err(ProviderError::new(Provider::OpenAI, ProviderErrorKind::EmptyChoices).into())
            } else {
                Ok(self.reply.clone())
            };
            Box::pin(async move { out })
        }
    }

    struct EmptySearch;

    impl SearchService for EmptySearch {
        fn search<'a>(
            &'a self,
            _query: &'a str,
        ) -> Pin<Box<dyn Future<Output = Result<SearchResponse, WebSearchError>> + Send + 'a>>
        {
            Box::pin(async { web_augmenter::tavily::parse_response(br#"{"results":[]}"#) })
        }
    }

    struct BrokenSearch;

    impl SearchService for BrokenSearch {
        fn search<'a>(
            &'a self,
            _query: &'a str,
        ) -> Pin<Box<dyn Future<Output = Result<SearchResponse, WebSearchError>> + Send + 'a>>
        {
            Box::pin(async { Err(WebSearchError::Decode("missing body".into())) })
        }
    }

    fn ask(question: &str) -> Submission {
        Submission {
            question: question.into(),
            ..Default::default()
        }
    }

    fn assistant(fake: Arc<FakeCompletion>) -> ResearchAssistant {
        ResearchAssistant::new(fake, WebAugmenter::disabled())
    }

    #[tokio::test]
    async fn empty_question_leaves_conversation_untouched() {
        let fake = FakeCompletion::answering(Some("unused"));
        let ra = assistant(fake.clone());
        let mut conv = Conversation::new();

        for q in ["", "   \n"] {
            let err = ra.submit(&mut conv, ask(q)).await.unwrap_err();
            assert!(matches!(err, RoundError::EmptyQuestion));
        }
        assert_eq!(conv.len(), 0);
        assert!(fake.seen.lock().unwrap().is_empty());
    }

    #[tokio::test]
    async fn plain_question_sends_two_messages_and_records_two_turns() {
        let fake = FakeCompletion::answering(Some("Two particles share one state."));
        let ra = assistant(fake.clone());
        let mut conv = Conversation::new();

        let out = ra
            .submit(&mut conv, ask("What is quantum entanglement?"))
            .await
            .unwrap();

        let seen = fake.seen.lock().unwrap();
        assert_eq!(seen.len(), 1);
        assert_eq!(seen[0].1.len(), 2);
        assert_eq!(conv.len(), 2);
        assert_eq!(conv.turns()[0].role(), TurnRole::User);
        assert_eq!(conv.turns()[1].role(), TurnRole::Assistant);
        assert_eq!(out.reply, "Two particles share one state.");
        assert!(!out.fell_back);
    }

    #[tokio::test]
    async fn fallback_answer_is_stored() {
        let fake = FakeCompletion::failing_for(Some("Fallback answer"), &[ModelId::LlamaMaverick]);
        let ra = assistant(fake.clone());
        let mut conv = Conversation::new();
        let sub = Submission {
            params: CompletionParams::new(ModelId::LlamaMaverick, 0.7, 1024).unwrap(),
            ..ask("q")
        };

        let out = ra.submit(&mut conv, sub).await.unwrap();

        let last = conv.last().unwrap();
        assert_eq!(last.role(), TurnRole::Assistant);
        assert_eq!(last.content(), "Fallback answer");
        assert_eq!(out.model, ModelId::Gpt4o);
        assert!(out.fell_back);
        let notice = out
            .statuses
            .iter()
            .find(|s| s.text.contains("retried"))
            .unwrap();
        assert!(notice.text.starts_with("meta-llama/llama-4-maverick:free failed ("));
        assert!(notice.text.contains("[AI LLM Service] OpenAI"));
    }

    #[tokio::test]
    async fn double_failure_keeps_only_the_user_turn() {
        let fake = FakeCompletion::failing_for(
            Some("never"),
            &[ModelId::DeepseekChat, ModelId::Gpt4o],
        );
        let ra = assistant(fake);
        let mut conv = Conversation::new();
        let sub = Submission {
            params: CompletionParams::new(ModelId::DeepseekChat, 0.2, 128).unwrap(),
            ..ask("q")
        };

        let err = ra.submit(&mut conv, sub).await.unwrap_err();
        assert!(matches!(err, RoundError::Completion(_)));
        assert_eq!(conv.len(), 1);
        assert_eq!(conv.last().unwrap().role(), TurnRole::User);
    }

    #[tokio::test]
    async fn empty_reply_is_replaced_by_placeholder() {
        let ra = assistant(FakeCompletion::answering(Some("")));
        let mut conv = Conversation::new();
        ra.submit(&mut conv, ask("q")).await.unwrap();
        assert_eq!(conv.last().unwrap().content(), EMPTY_REPLY_PLACEHOLDER);
    }

    #[tokio::test]
    async fn empty_search_results_add_no_web_message() {
        let fake = FakeCompletion::answering(Some("a"));
        let ra = ResearchAssistant::new(fake.clone(), WebAugmenter::new(Arc::new(EmptySearch)));
        let mut conv = Conversation::new();
        let sub = Submission {
            use_web: true,
            ..ask("q")
        };

        let out = ra.submit(&mut conv, sub).await.unwrap();

        let seen = fake.seen.lock().unwrap();
        assert_eq!(seen[0].1.len(), 2);
        assert!(
            !seen[0]
                .1
                .iter()
                .any(|m| m.content.starts_with(prompt::WEB_PREFIX))
        );
        assert_eq!(out.web_results, 0);
    }

    #[tokio::test]
    async fn search_failure_is_soft() {
        let fake = FakeCompletion::answering(Some("a"));
        let ra = ResearchAssistant::new(fake.clone(), WebAugmenter::new(Arc::new(BrokenSearch)));
        let mut conv = Conversation::new();
        let sub = Submission {
            use_web: true,
            ..ask("q")
        };

        let out = ra.submit(&mut conv, sub).await.unwrap();

        let seen = fake.seen.lock().unwrap();
        assert!(seen[0].1[1].content.contains("(Web search failed: "));
        assert_eq!(conv.len(), 2);
        assert!(out.statuses.iter().any(|s| s.text.starts_with("Web search failed")));
    }

    #[tokio::test]
    async fn unreadable_upload_degrades_to_no_context() {
        let fake = FakeCompletion::answering(Some("a"));
        let ra = assistant(fake.clone());
        let mut conv = Conversation::new();
        let sub = Submission {
            upload: Some(
                Upload::new(DocumentKind::Pdf, b"%PDF-garbage".to_vec()).with_file_name("x.pdf"),
            ),
            pasted: Some("ignored because an upload is present".into()),
            ..ask("q")
        };

        let out = ra.submit(&mut conv, sub).await.unwrap();

        assert_eq!(out.context_chars, 0);
        assert_eq!(fake.seen.lock().unwrap()[0].1.len(), 2);
        assert!(out.statuses.iter().any(|s| s.text.contains("x.pdf")));
        assert_eq!(conv.len(), 2);
    }

    #[tokio::test]
    async fn pasted_context_and_history_window_reach_the_model() {
        let fake = FakeCompletion::answering(Some("a"));
        let ra = assistant(fake.clone());
        let mut conv = Conversation::new();
        for i in 0..3 {
            ra.submit(&mut conv, ask(&format!("q{i}"))).await.unwrap();
        }

        let sub = Submission {
            pasted: Some("  notes  ".into()),
            ..ask("q3")
        };
        ra.submit(&mut conv, sub).await.unwrap();

        let seen = fake.seen.lock().unwrap();
        let last = &seen.last().unwrap().1;
        assert_eq!(last[1].content, format!("{}notes", prompt::CONTEXT_PREFIX));
        let tail: Vec<_> = last[2..].iter().map(|m| m.content.as_str()).collect();
        assert_eq!(tail, ["a", "q2", "a", "q3"]);
        assert_eq!(conv.len(), 8);
    }
}
