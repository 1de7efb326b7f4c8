//! Board reconciliation
//!
//! Converges a PR's project-board card to the column its approval state
//! calls for: classify, resolve the route, locate the existing card, then
//! move, create, or do nothing. Every pass recomputes the state from
//! upstream truth; together with the current-position checks this makes
//! overlapping reconciliations of the same PR safe in any order.

use crate::classifier::{classify, ApprovalState, ClassifierSettings};
use crate::column_map::{resolve, BoardColumns};
use crate::locator::{card_in_column, find_card};
use crate::notify::Notifier;
use board_bot_config::ProjectBoardConfig;
use gh_board_client::{CardContentType, GitHubClient, PullRequest, PullRequestRef};
use log::{debug, info, warn};
use std::sync::Arc;

/// What a reconciliation pass did (or, under dry-run, would have done)
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ReconcileOutcome {
    /// No route for the current state; expected steady state
    NoAction,

    /// The card is already where it belongs
    AlreadyInPlace,

    /// The card was moved between managed columns
    Moved { card_id: u64, to: String },

    /// A new card was created in the destination column
    Created { column: String },
}

/// Reconciles PR cards against their approval state
pub struct Reconciler {
    github: Arc<dyn GitHubClient>,
    notifier: Arc<dyn Notifier>,
    settings: ClassifierSettings,
    bot_context_prefix: Option<String>,
    room: Option<String>,
    dry_run: bool,
}

impl Reconciler {
    pub fn new(
        github: Arc<dyn GitHubClient>,
        notifier: Arc<dyn Notifier>,
        config: &ProjectBoardConfig,
        room: Option<String>,
        dry_run: bool,
    ) -> Self {
        Self {
            github,
            notifier,
            settings: ClassifierSettings {
                min_approvers: config.min_approvers,
                tested_label: config.tested_label.clone(),
            },
            bot_context_prefix: config.bot_context_prefix.clone(),
            room,
            dry_run,
        }
    }

    /// Fetch current upstream truth for a PR and classify it
    ///
    /// Fetch failures mean "state unknown, skip this PR this round" and
    /// propagate to the caller.
    pub async fn approval_state(
        &self,
        pr_ref: &PullRequestRef,
    ) -> anyhow::Result<(PullRequest, Option<ApprovalState>)> {
        let pr = self.github.fetch_pull_request(pr_ref).await?;
        let reviews = self.github.list_reviews(pr_ref).await?;
        let status = self
            .github
            .fetch_commit_status(&pr_ref.owner, &pr_ref.repo, &pr.head_sha)
            .await?;

        let prefix = self.bot_context_prefix.as_deref();
        let state = classify(&pr, &reviews, &status, &self.settings, |context| {
            prefix.is_some_and(|p| context.starts_with(p))
        });
        debug!("PR {} classified as {:?}", pr_ref, state);

        Ok((pr, state))
    }

    /// Classify a PR and converge its card position
    pub async fn reconcile(
        &self,
        pr_ref: &PullRequestRef,
        columns: &BoardColumns,
    ) -> anyhow::Result<ReconcileOutcome> {
        let (pr, state) = self.approval_state(pr_ref).await?;
        self.reconcile_classified(&pr, state, columns).await
    }

    /// Converge the card position for an already-classified PR
    pub async fn reconcile_classified(
        &self,
        pr: &PullRequest,
        state: Option<ApprovalState>,
        columns: &BoardColumns,
    ) -> anyhow::Result<ReconcileOutcome> {
        let Some(route) = resolve(state, columns) else {
            debug!("PR #{} needs no card action this round", pr.number);
            return Ok(ReconcileOutcome::NoAction);
        };

        debug!(
            "Handling PR #{}; card should be in {} column",
            pr.number, route.dst_column.name
        );

        let found = find_card(self.github.as_ref(), &route.src_columns, &pr.issue_url).await?;

        if let Some((src_column, card)) = found {
            if src_column.id == route.dst_column.id {
                return Ok(ReconcileOutcome::AlreadyInPlace);
            }

            if self.dry_run {
                info!(
                    "Would have moved card {} to {} for PR #{}",
                    card.id, route.dst_column.name, pr.number
                );
            } else if let Err(err) = self.github.move_card(card.id, route.dst_column.id).await {
                self.notify_best_effort(&format!(
                    "I couldn't move the PR to {} column :confused:\n{}",
                    route.dst_column.name, pr.html_url
                ))
                .await;
                return Err(err);
            } else {
                info!(
                    "Moved card {} to {} for PR #{}",
                    card.id, route.dst_column.name, pr.number
                );
            }

            self.notify_best_effort(&format!(
                "Assigned PR to {} column\n{}",
                route.dst_column.name, pr.html_url
            ))
            .await;

            return Ok(ReconcileOutcome::Moved {
                card_id: card.id,
                to: route.dst_column.name.clone(),
            });
        }

        debug!(
            "Didn't find card for PR #{} in source column(s)",
            pr.number
        );

        // The card may already sit at the destination (created by an earlier
        // pass that raced this one)
        if card_in_column(self.github.as_ref(), route.dst_column, &pr.issue_url)
            .await?
            .is_some()
        {
            debug!("Found card in target column, ignoring");
            return Ok(ReconcileOutcome::AlreadyInPlace);
        }

        if self.dry_run {
            info!(
                "Would have created card in {} column for PR #{}",
                route.dst_column.name, pr.number
            );
        } else {
            let card = self
                .github
                .create_card(route.dst_column.id, CardContentType::PullRequest, pr.id)
                .await?;
            info!(
                "Created card {} in {} for PR #{}",
                card.id, route.dst_column.name, pr.number
            );
        }

        self.notify_best_effort(&format!(
            "Assigned PR to {} column\n{}",
            route.dst_column.name, pr.html_url
        ))
        .await;

        Ok(ReconcileOutcome::Created {
            column: route.dst_column.name.clone(),
        })
    }

    /// Place a freshly opened PR in the review column
    ///
    /// No-ops when the PR already has a card in any managed column.
    pub async fn place_new_pull_request(
        &self,
        pr: &PullRequest,
        columns: &BoardColumns,
    ) -> anyhow::Result<ReconcileOutcome> {
        let managed = columns.managed();
        if find_card(self.github.as_ref(), &managed, &pr.issue_url)
            .await?
            .is_some()
        {
            debug!("PR #{} already has a card, ignoring", pr.number);
            return Ok(ReconcileOutcome::AlreadyInPlace);
        }

        if self.dry_run {
            info!(
                "Would have created card in {} column for PR #{}",
                columns.review.name, pr.number
            );
        } else {
            let card = self
                .github
                .create_card(columns.review.id, CardContentType::PullRequest, pr.id)
                .await?;
            info!(
                "Created card {} in {} for PR #{}",
                card.id, columns.review.name, pr.number
            );
        }

        self.notify_best_effort(&format!(
            "Assigned PR to {} column\n{}",
            columns.review.name, pr.html_url
        ))
        .await;

        Ok(ReconcileOutcome::Created {
            column: columns.review.name.clone(),
        })
    }

    /// Post an outcome notification; failures never affect board state
    async fn notify_best_effort(&self, message: &str) {
        let Some(room) = self.room.as_deref() else {
            return;
        };
        if let Err(err) = self.notifier.send(room, message).await {
            warn!("Failed to send notification to '{}': {}", room, err);
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::test_support::{
        approval, board_columns, changes_requested, make_pr, MockClient, RecordingNotifier,
        CONTRIBUTOR_COLUMN, REVIEW_COLUMN, TEST_COLUMN,
    };
    use gh_board_client::MergeableState;

    fn board_config() -> ProjectBoardConfig {
        toml::from_str(
            r#"
            name = "Pipeline for QA"
            contributor_column = "CONTRIBUTOR"
            review_column = "REVIEW"
            test_column = "TO TEST"
            tested_label = "Tested - OK"
        "#,
        )
        .unwrap()
    }

    fn reconciler(
        github: Arc<MockClient>,
        notifier: Arc<RecordingNotifier>,
        dry_run: bool,
    ) -> Reconciler {
        Reconciler::new(
            github,
            notifier,
            &board_config(),
            Some("status-probot".into()),
            dry_run,
        )
    }

    fn pr_ref(number: u64) -> PullRequestRef {
        PullRequestRef::new("o", "r", number)
    }

    #[tokio::test]
    async fn test_dirty_pr_moves_from_review_to_contributor() {
        // Scenario A: hard conflict sends the card back to the contributor
        let github = Arc::new(MockClient::with_board());
        let mut pr = make_pr(1, MergeableState::Dirty);
        pr.mergeable = Some(false);
        let issue_url = pr.issue_url.clone();
        github.add_pr(pr);
        let card_id = github.seed_card(REVIEW_COLUMN, &issue_url);

        let notifier = Arc::new(RecordingNotifier::default());
        let sut = reconciler(github.clone(), notifier.clone(), false);

        let outcome = sut.reconcile(&pr_ref(1), &board_columns()).await.unwrap();
        assert_eq!(
            outcome,
            ReconcileOutcome::Moved {
                card_id,
                to: "CONTRIBUTOR".into()
            }
        );

        let cards = github.cards_for(&issue_url);
        assert_eq!(cards.len(), 1);
        assert_eq!(cards[0].column_id, CONTRIBUTOR_COLUMN);
        assert_eq!(notifier.messages.lock().unwrap().len(), 1);
    }

    #[tokio::test]
    async fn test_approved_pr_without_card_creates_in_test() {
        // Scenario B: approved PR with no existing card
        let github = Arc::new(MockClient::with_board());
        let pr = make_pr(2, MergeableState::Clean);
        let issue_url = pr.issue_url.clone();
        github.add_pr(pr);
        github.add_reviews(2, vec![approval(1), approval(2)]);

        let notifier = Arc::new(RecordingNotifier::default());
        let sut = reconciler(github.clone(), notifier, false);

        let outcome = sut.reconcile(&pr_ref(2), &board_columns()).await.unwrap();
        assert_eq!(
            outcome,
            ReconcileOutcome::Created {
                column: "TO TEST".into()
            }
        );

        let cards = github.cards_for(&issue_url);
        assert_eq!(cards.len(), 1);
        assert_eq!(cards[0].column_id, TEST_COLUMN);
    }

    #[tokio::test]
    async fn test_awaiting_reviewers_moves_back_to_review() {
        // Scenario C: one approval against a threshold of two
        let github = Arc::new(MockClient::with_board());
        let pr = make_pr(3, MergeableState::Clean);
        let issue_url = pr.issue_url.clone();
        github.add_pr(pr);
        github.add_reviews(3, vec![approval(1)]);
        github.seed_card(TEST_COLUMN, &issue_url);

        let notifier = Arc::new(RecordingNotifier::default());
        let sut = reconciler(github.clone(), notifier, false);

        let outcome = sut.reconcile(&pr_ref(3), &board_columns()).await.unwrap();
        assert!(matches!(outcome, ReconcileOutcome::Moved { ref to, .. } if to == "REVIEW"));

        let cards = github.cards_for(&issue_url);
        assert_eq!(cards.len(), 1);
        assert_eq!(cards[0].column_id, REVIEW_COLUMN);
    }

    #[tokio::test]
    async fn test_second_run_is_a_no_op() {
        // Scenario D: unchanged upstream data yields zero extra mutations
        let github = Arc::new(MockClient::with_board());
        let pr = make_pr(4, MergeableState::Clean);
        let issue_url = pr.issue_url.clone();
        github.add_pr(pr);
        github.add_reviews(4, vec![approval(1), approval(2)]);
        github.seed_card(REVIEW_COLUMN, &issue_url);

        let notifier = Arc::new(RecordingNotifier::default());
        let sut = reconciler(github.clone(), notifier, false);
        let columns = board_columns();

        let first = sut.reconcile(&pr_ref(4), &columns).await.unwrap();
        assert!(matches!(first, ReconcileOutcome::Moved { .. }));
        let mutations_after_first = github.mutation_count();

        let second = sut.reconcile(&pr_ref(4), &columns).await.unwrap();
        assert_eq!(second, ReconcileOutcome::AlreadyInPlace);
        assert_eq!(github.mutation_count(), mutations_after_first);

        // At-most-one-card invariant holds after repeated passes
        assert_eq!(github.cards_for(&issue_url).len(), 1);
    }

    #[tokio::test]
    async fn test_changes_requested_beats_approvals() {
        let github = Arc::new(MockClient::with_board());
        let pr = make_pr(5, MergeableState::Clean);
        let issue_url = pr.issue_url.clone();
        github.add_pr(pr);
        github.add_reviews(5, vec![approval(1), approval(2), changes_requested(3)]);
        github.seed_card(TEST_COLUMN, &issue_url);

        let notifier = Arc::new(RecordingNotifier::default());
        let sut = reconciler(github.clone(), notifier, false);

        let outcome = sut.reconcile(&pr_ref(5), &board_columns()).await.unwrap();
        assert!(matches!(outcome, ReconcileOutcome::Moved { ref to, .. } if to == "CONTRIBUTOR"));
    }

    #[tokio::test]
    async fn test_tested_label_suppresses_action() {
        let github = Arc::new(MockClient::with_board());
        let mut pr = make_pr(6, MergeableState::Clean);
        pr.labels.push("Tested - OK".into());
        github.add_pr(pr);
        github.add_reviews(6, vec![approval(1), approval(2)]);

        let notifier = Arc::new(RecordingNotifier::default());
        let sut = reconciler(github.clone(), notifier, false);

        let outcome = sut.reconcile(&pr_ref(6), &board_columns()).await.unwrap();
        assert_eq!(outcome, ReconcileOutcome::NoAction);
        assert_eq!(github.mutation_count(), 0);
    }

    #[tokio::test]
    async fn test_dry_run_reports_intent_without_mutations() {
        let github = Arc::new(MockClient::with_board());
        let pr = make_pr(7, MergeableState::Clean);
        let issue_url = pr.issue_url.clone();
        github.add_pr(pr);
        github.add_reviews(7, vec![approval(1), approval(2)]);
        github.seed_card(REVIEW_COLUMN, &issue_url);

        let notifier = Arc::new(RecordingNotifier::default());
        let sut = reconciler(github.clone(), notifier, true);

        let outcome = sut.reconcile(&pr_ref(7), &board_columns()).await.unwrap();
        // Same decision as a live run, but no board mutation happened
        assert!(matches!(outcome, ReconcileOutcome::Moved { ref to, .. } if to == "TO TEST"));
        assert_eq!(github.mutation_count(), 0);
        assert_eq!(github.cards_for(&issue_url)[0].column_id, REVIEW_COLUMN);
    }

    #[tokio::test]
    async fn test_card_already_at_destination_is_left_alone() {
        let github = Arc::new(MockClient::with_board());
        let pr = make_pr(8, MergeableState::Clean);
        let issue_url = pr.issue_url.clone();
        github.add_pr(pr);
        github.add_reviews(8, vec![approval(1), approval(2)]);
        github.seed_card(TEST_COLUMN, &issue_url);

        let notifier = Arc::new(RecordingNotifier::default());
        let sut = reconciler(github.clone(), notifier, false);

        let outcome = sut.reconcile(&pr_ref(8), &board_columns()).await.unwrap();
        assert_eq!(outcome, ReconcileOutcome::AlreadyInPlace);
        assert_eq!(github.mutation_count(), 0);
        assert_eq!(github.cards_for(&issue_url).len(), 1);
    }

    #[tokio::test]
    async fn test_notification_failure_does_not_affect_board() {
        let github = Arc::new(MockClient::with_board());
        let mut pr = make_pr(9, MergeableState::Dirty);
        pr.mergeable = Some(false);
        let issue_url = pr.issue_url.clone();
        github.add_pr(pr);
        github.seed_card(TEST_COLUMN, &issue_url);

        let notifier = Arc::new(RecordingNotifier {
            fail: true,
            ..Default::default()
        });
        let sut = reconciler(github.clone(), notifier, false);

        let outcome = sut.reconcile(&pr_ref(9), &board_columns()).await.unwrap();
        assert!(matches!(outcome, ReconcileOutcome::Moved { .. }));
        assert_eq!(github.cards_for(&issue_url)[0].column_id, CONTRIBUTOR_COLUMN);
    }

    #[tokio::test]
    async fn test_fetch_failure_propagates() {
        // PR 99 does not exist in the mock; the error aborts only this PR
        let github = Arc::new(MockClient::with_board());
        let notifier = Arc::new(RecordingNotifier::default());
        let sut = reconciler(github.clone(), notifier, false);

        let result = sut.reconcile(&pr_ref(99), &board_columns()).await;
        assert!(result.is_err());
        assert_eq!(github.mutation_count(), 0);
    }

    #[tokio::test]
    async fn test_place_new_pull_request_creates_in_review() {
        let github = Arc::new(MockClient::with_board());
        let pr = make_pr(10, MergeableState::Unknown);
        let issue_url = pr.issue_url.clone();
        github.add_pr(pr.clone());

        let notifier = Arc::new(RecordingNotifier::default());
        let sut = reconciler(github.clone(), notifier, false);

        let outcome = sut
            .place_new_pull_request(&pr, &board_columns())
            .await
            .unwrap();
        assert_eq!(
            outcome,
            ReconcileOutcome::Created {
                column: "REVIEW".into()
            }
        );
        assert_eq!(github.cards_for(&issue_url)[0].column_id, REVIEW_COLUMN);

        // A second opened event must not produce a duplicate card
        let outcome = sut
            .place_new_pull_request(&pr, &board_columns())
            .await
            .unwrap();
        assert_eq!(outcome, ReconcileOutcome::AlreadyInPlace);
        assert_eq!(github.cards_for(&issue_url).len(), 1);
    }
}
