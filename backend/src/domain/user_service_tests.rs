//! Tests for the user service and its error mapping.

use super::*;
use crate::domain::ports::MockUserRepository;
use crate::domain::{Email, ErrorCode, PasswordCredentials, Photo, UserName, UserSummary};
use crate::test_support::FixtureClock;
use chrono::{DateTime, TimeZone, Utc};
use pagination::PageNumber;
use rstest::{fixture, rstest};

fn now() -> DateTime<Utc> {
    Utc.with_ymd_and_hms(2024, 6, 1, 12, 0, 0)
        .single()
        .expect("valid timestamp")
}

fn user(name: &str) -> User {
    User::new(
        UserId::random(),
        UserName::new(name).expect("valid name"),
        Email::new(format!("{}@example.com", name.to_lowercase())).expect("valid email"),
        PasswordCredentials::new("hash", "salt"),
        now(),
    )
}

fn service(repo: MockUserRepository) -> UserService<MockUserRepository> {
    UserService::new(Arc::new(repo), Arc::new(FixtureClock(now())))
}

fn first_page() -> PageRequest {
    PageRequest::new(PageNumber::FIRST, 9).expect("valid request")
}

#[fixture]
fn ada() -> User {
    user("Ada")
}

#[rstest]
#[tokio::test]
async fn fetch_profile_returns_stored_user(ada: User) {
    let mut repo = MockUserRepository::new();
    let stored = ada.clone();
    repo.expect_find_by_id()
        .withf({
            let id = ada.id().clone();
            move |candidate| candidate == &id
        })
        .times(1)
        .return_once(move |_| Ok(Some(stored)));

    let profile = service(repo).fetch_profile(ada.id()).await.expect("profile");
    assert_eq!(profile, ada);
}

#[rstest]
#[tokio::test]
async fn fetch_profile_maps_missing_user_to_not_found() {
    let mut repo = MockUserRepository::new();
    repo.expect_find_by_id().return_once(|_| Ok(None));

    let err = service(repo)
        .fetch_profile(&UserId::random())
        .await
        .expect_err("missing user");
    assert_eq!(err.code(), ErrorCode::NotFound);
    assert_eq!(err.message(), USER_NOT_FOUND_MESSAGE);
}

#[rstest]
#[case(UserPersistenceError::connection("refused"), ErrorCode::ServiceUnavailable)]
#[case(UserPersistenceError::query("syntax"), ErrorCode::InternalError)]
#[tokio::test]
async fn fetch_profile_maps_store_failures(
    #[case] failure: UserPersistenceError,
    #[case] expected: ErrorCode,
) {
    let mut repo = MockUserRepository::new();
    repo.expect_find_by_id().return_once(move |_| Err(failure));

    let err = service(repo)
        .fetch_profile(&UserId::random())
        .await
        .expect_err("store failure");
    assert_eq!(err.code(), expected);
}

#[rstest]
#[tokio::test]
async fn list_users_combines_count_and_slice(ada: User) {
    let mut repo = MockUserRepository::new();
    repo.expect_count()
        .withf(|filter| filter == &UserFilter::All)
        .return_once(|_| Ok(12));
    let listing = ada.listing();
    repo.expect_list()
        .withf(|filter, page| filter == &UserFilter::All && page.offset() == 0)
        .return_once(move |_, _| Ok(vec![listing]));

    let page = service(repo)
        .list_users(first_page())
        .await
        .expect("page");

    assert_eq!(page.total_items(), 12);
    assert_eq!(page.per_page(), 9);
    assert_eq!(page.items(), &[ada.listing()]);
}

#[rstest]
#[tokio::test]
async fn find_people_excludes_viewer_and_followed_users(ada: User) {
    let followed = user("Grace");
    let viewer = ada.with_relationships(vec![followed.summary()], Vec::new());
    let expected = UserFilter::Excluding(vec![followed.id().clone(), viewer.id().clone()]);

    let mut repo = MockUserRepository::new();
    let count_filter = expected.clone();
    repo.expect_count()
        .withf(move |filter| filter == &count_filter)
        .return_once(|_| Ok(0));
    repo.expect_list()
        .withf(move |filter, _| filter == &expected)
        .return_once(|_, _| Ok(Vec::new()));

    let page = service(repo)
        .find_people(&viewer, first_page())
        .await
        .expect("page");
    assert_eq!(page.total_items(), 0);
    assert!(page.items().is_empty());
}

#[rstest]
#[tokio::test]
async fn list_users_propagates_connection_failures() {
    let mut repo = MockUserRepository::new();
    repo.expect_count()
        .return_once(|_| Err(UserPersistenceError::connection("down")));

    let err = service(repo)
        .list_users(first_page())
        .await
        .expect_err("store down");
    assert_eq!(err.code(), ErrorCode::ServiceUnavailable);
}

#[rstest]
#[tokio::test]
async fn update_profile_stamps_and_saves_once(ada: User) {
    let mut repo = MockUserRepository::new();
    repo.expect_save_profile()
        .withf(|user| {
            user.name().as_ref() == "Ada Byron"
                && user.updated() == Some(now())
                && user.photo().map(Photo::content_type) == Some("image/png")
        })
        .times(1)
        .return_once(|_| Ok(()));

    let photo = Photo::new(vec![1, 2], Some("image/png")).expect("photo");
    let update =
        ProfileUpdate::from_form(Some("Ada Byron"), None, None, Some(photo)).expect("update");
    let updated = service(repo)
        .update_profile(ada, update)
        .await
        .expect("updated");

    assert_eq!(updated.name().as_ref(), "Ada Byron");
    assert_eq!(updated.updated(), Some(now()));
}

#[rstest]
#[case(UserPersistenceError::email_taken(), ErrorCode::InvalidRequest, "email already in use")]
#[case(
    UserPersistenceError::query("constraint violated"),
    ErrorCode::InvalidRequest,
    "user repository query failed: constraint violated"
)]
#[case(
    UserPersistenceError::missing_user("x"),
    ErrorCode::NotFound,
    USER_NOT_FOUND_MESSAGE
)]
#[tokio::test]
async fn update_profile_maps_rejected_writes(
    ada: User,
    #[case] failure: UserPersistenceError,
    #[case] code: ErrorCode,
    #[case] message: &str,
) {
    let mut repo = MockUserRepository::new();
    repo.expect_save_profile().return_once(move |_| Err(failure));

    let err = service(repo)
        .update_profile(ada, ProfileUpdate::default())
        .await
        .expect_err("write rejected");
    assert_eq!(err.code(), code);
    assert_eq!(err.message(), message);
}

#[rstest]
#[tokio::test]
async fn delete_profile_reports_vanished_user(ada: User) {
    let mut repo = MockUserRepository::new();
    repo.expect_delete().return_once(|_| Ok(false));

    let err = service(repo)
        .delete_profile(&ada)
        .await
        .expect_err("already gone");
    assert_eq!(err.code(), ErrorCode::NotFound);
}

#[rstest]
#[tokio::test]
async fn delete_profile_removes_user(ada: User) {
    let mut repo = MockUserRepository::new();
    repo.expect_delete().times(1).return_once(|_| Ok(true));

    service(repo).delete_profile(&ada).await.expect("deleted");
}

#[rstest]
#[tokio::test]
async fn follow_records_edge_and_returns_target(ada: User) {
    let grace = user("Grace");
    let updated_target = grace
        .clone()
        .with_relationships(Vec::new(), vec![ada.summary()]);

    let mut repo = MockUserRepository::new();
    repo.expect_add_follow().times(2).returning(|_, _| Ok(()));
    repo.expect_find_by_id()
        .times(1)
        .return_once(move |_| Ok(Some(updated_target)));

    let target = service(repo)
        .follow(ada.id(), grace.id())
        .await
        .expect("followed");

    assert_eq!(
        target.followers(),
        &[UserSummary {
            id: ada.id().clone(),
            name: ada.name().clone(),
        }]
    );
}

#[rstest]
#[tokio::test]
async fn follow_rejects_self_before_touching_store(ada: User) {
    let repo = MockUserRepository::new();

    let err = service(repo)
        .follow(ada.id(), ada.id())
        .await
        .expect_err("self follow");
    assert_eq!(err.code(), ErrorCode::InvalidRequest);
    assert_eq!(err.message(), SELF_FOLLOW_MESSAGE);
}

#[rstest]
#[tokio::test]
async fn follow_maps_missing_target_to_not_found(ada: User) {
    let mut repo = MockUserRepository::new();
    repo.expect_add_follow()
        .return_once(|_, followee| Err(UserPersistenceError::missing_user(followee.to_string())));

    let err = service(repo)
        .follow(ada.id(), &UserId::random())
        .await
        .expect_err("missing target");
    assert_eq!(err.code(), ErrorCode::NotFound);
}

#[rstest]
#[tokio::test]
async fn unfollow_removes_edge_and_returns_target(ada: User) {
    let grace = user("Grace");
    let target = grace.clone();

    let mut repo = MockUserRepository::new();
    repo.expect_remove_follow().times(2).returning(|_, _| Ok(()));
    repo.expect_find_by_id()
        .return_once(move |_| Ok(Some(target)));

    let returned = service(repo)
        .unfollow(ada.id(), grace.id())
        .await
        .expect("unfollowed");
    assert!(returned.followers().is_empty());
}
