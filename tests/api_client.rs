//! API client integration tests against an in-process mock server

mod common;

use axum::http::Method;
use serde_json::json;
use std::collections::BTreeSet;
use tokio_test::{assert_err, assert_ok};

use common::{logged_in_session, MockServer};
use library_console::{
    error::{ClientError, ErrorKind, UNAUTHORIZED_MESSAGE},
    models::{
        BorrowStatus, CreateBook, CreateCategory, CreatePermission, CreateRole, CreateUser,
        RoleChange, UpdateBook,
    },
    session::Session,
    views::{DashboardSummary, RbacSnapshot},
};

#[tokio::test]
async fn test_list_books_sends_auth_and_content_type() {
    let server = MockServer::start().await;
    server.respond(
        Method::GET,
        "/book",
        200,
        json!([{
            "id": 1, "title": "Clean Code", "author": "Robert Martin",
            "isbn": "978-0132350884", "category": {"id": 2, "name": "Technology"},
            "totalCopies": 3, "availableQuantity": 2
        }])
        .to_string(),
    );

    let (session, token) = logged_in_session();
    let api = server.clients(session);

    let books = assert_ok!(api.books.list().await);
    assert_eq!(books.len(), 1);
    assert_eq!(books[0].title, "Clean Code");
    assert_eq!(books[0].available_quantity, 2);

    let requests = server.requests();
    assert_eq!(requests.len(), 1);
    assert_eq!(requests[0].authorization, Some(format!("Bearer {}", token)));
    assert_eq!(requests[0].content_type.as_deref(), Some("application/json"));
}

#[tokio::test]
async fn test_no_authorization_header_without_token() {
    let server = MockServer::start().await;
    server.respond(Method::GET, "/categories", 200, "[]");

    let api = server.clients(Session::in_memory());
    let categories = assert_ok!(api.categories.list().await);
    assert!(categories.is_empty());

    let request = &server.requests()[0];
    assert_eq!(request.authorization, None);
    assert_eq!(request.content_type.as_deref(), Some("application/json"));
}

#[tokio::test]
async fn test_list_accepts_data_envelope() {
    let server = MockServer::start().await;
    server.respond(
        Method::GET,
        "/permissions",
        200,
        json!({"data": [{"id": 1, "name": "read", "category": "Content"}]}).to_string(),
    );

    let (session, _) = logged_in_session();
    let permissions = assert_ok!(server.clients(session).permissions.list().await);
    assert_eq!(permissions[0].category.as_deref(), Some("Content"));
}

#[tokio::test]
async fn test_unauthorized_is_distinguished_for_every_module() {
    let server = MockServer::start().await;
    for path in ["/book", "/categories", "/permissions", "/roles", "/users", "/book-borrow", "/users/me"] {
        server.respond(Method::GET, path, 401, r#"{"message":"Unauthorized"}"#);
    }
    server.respond(Method::DELETE, "/book/1", 401, "");
    server.respond(Method::POST, "/users/1/role/2", 401, "");

    let (session, _) = logged_in_session();
    let api = server.clients(session);

    let errors = vec![
        assert_err!(api.books.list().await),
        assert_err!(api.categories.list().await),
        assert_err!(api.permissions.list().await),
        assert_err!(api.roles.list().await),
        assert_err!(api.users.list().await),
        assert_err!(api.borrowings.list().await),
        assert_err!(api.roles.current_user().await),
        assert_err!(api.books.delete(1).await),
        assert_err!(api.users.assign_role(1, 2).await),
    ];

    for error in errors {
        assert!(matches!(error, ClientError::Unauthorized), "got {:?}", error);
        assert_eq!(error.kind(), ErrorKind::Unauthorized);
        assert_eq!(error.to_string(), UNAUTHORIZED_MESSAGE);
    }
}

#[tokio::test]
async fn test_other_status_is_operation_failure() {
    let server = MockServer::start().await;
    server.respond(Method::PATCH, "/categories/4", 500, r#"{"message":"boom"}"#);
    server.respond(Method::GET, "/roles", 403, "");

    let (session, _) = logged_in_session();
    let api = server.clients(session);

    let update = api
        .categories
        .update(4, &Default::default())
        .await;
    match assert_err!(update) {
        ClientError::Operation { operation, status } => {
            assert_eq!(operation, "Update category");
            assert_eq!(status, 500);
        }
        other => panic!("unexpected error {:?}", other),
    }

    let forbidden = assert_err!(api.roles.list().await);
    assert_eq!(forbidden.kind(), ErrorKind::Operation);
    assert_eq!(forbidden.status(), Some(403));
    assert!(!forbidden.is_unauthorized());
}

#[tokio::test]
async fn test_malformed_body_is_transport_failure() {
    let server = MockServer::start().await;
    server.respond(Method::GET, "/book", 200, "<html>not json</html>");

    let (session, _) = logged_in_session();
    let error = assert_err!(server.clients(session).books.list().await);
    assert!(matches!(error, ClientError::Decode { .. }));
    assert_eq!(error.kind(), ErrorKind::Transport);
}

#[tokio::test]
async fn test_unreachable_server_is_transport_failure() {
    let listener = std::net::TcpListener::bind("127.0.0.1:0").unwrap();
    let port = listener.local_addr().unwrap().port();
    drop(listener);

    let client = library_console::api::ApiClient::new(
        &library_console::config::ApiConfig {
            base_url: format!("http://127.0.0.1:{}", port),
        },
        Session::in_memory(),
    )
    .unwrap();
    let api = library_console::api::ApiClients::new(client);

    let error = assert_err!(api.books.list().await);
    assert!(matches!(error, ClientError::Transport { .. }));
}

#[tokio::test]
async fn test_users_list_tolerates_empty_body() {
    let server = MockServer::start().await;
    server.respond(Method::GET, "/users", 200, "");

    let (session, _) = logged_in_session();
    let users = assert_ok!(server.clients(session).users.list().await);
    assert!(users.is_empty());
}

#[tokio::test]
async fn test_delete_returns_true_for_every_module() {
    let server = MockServer::start().await;
    for path in ["/book/3", "/categories/3", "/permissions/3", "/roles/3", "/users/3"] {
        server.respond(Method::DELETE, path, 200, "");
    }
    server.respond(Method::DELETE, "/users/3/role/9", 204, "");

    let (session, _) = logged_in_session();
    let api = server.clients(session);

    assert!(assert_ok!(api.books.delete(3).await));
    assert!(assert_ok!(api.categories.delete(3).await));
    assert!(assert_ok!(api.permissions.delete(3).await));
    assert!(assert_ok!(api.roles.delete(3).await));
    assert!(assert_ok!(api.users.delete(3).await));
    assert!(assert_ok!(api.users.remove_role(3, 9).await));
}

#[tokio::test]
async fn test_create_and_update_bodies() {
    let server = MockServer::start().await;
    server.respond(
        Method::POST,
        "/book",
        201,
        json!({"id": 10, "title": "Dune", "author": "Frank Herbert", "totalCopies": 2}).to_string(),
    );
    server.respond(
        Method::PATCH,
        "/book/10",
        200,
        json!({"id": 10, "title": "Dune", "author": "Frank Herbert", "totalCopies": 2, "availableQuantity": 1}).to_string(),
    );

    let (session, _) = logged_in_session();
    let api = server.clients(session);

    let created = assert_ok!(
        api.books
            .create(&CreateBook {
                title: "Dune".into(),
                author: "Frank Herbert".into(),
                isbn: None,
                category_id: Some(2),
                total_copies: 2,
                available_quantity: None,
            })
            .await
    );
    assert_eq!(created.id, 10);
    assert_eq!(created.available_quantity, 2);

    let updated = assert_ok!(
        api.books
            .update(10, &UpdateBook { available_quantity: Some(1), ..Default::default() })
            .await
    );
    assert_eq!(updated.available_quantity, 1);

    let create_request = &server.requests_to(&Method::POST, "/book")[0];
    assert_eq!(
        create_request.json(),
        json!({"title": "Dune", "author": "Frank Herbert", "categoryId": 2, "totalCopies": 2})
    );
    let update_request = &server.requests_to(&Method::PATCH, "/book/10")[0];
    assert_eq!(update_request.json(), json!({"availableQuantity": 1}));
}

#[tokio::test]
async fn test_invalid_payloads_are_not_sent() {
    let server = MockServer::start().await;
    let (session, _) = logged_in_session();
    let api = server.clients(session);

    let category = api
        .categories
        .create(&CreateCategory { name: String::new(), description: None })
        .await;
    let user = api
        .users
        .create(&CreateUser {
            email: "nope".into(),
            password: "secret123".into(),
            name: None,
            role_id: None,
        })
        .await;
    let role = api
        .roles
        .create(&CreateRole { name: String::new(), description: None, parent_id: None })
        .await;
    let permission = api
        .permissions
        .create(&CreatePermission { name: String::new(), description: None, category: None })
        .await;

    for result in [category.map(|_| ()), user.map(|_| ()), role.map(|_| ()), permission.map(|_| ())] {
        assert_eq!(assert_err!(result).kind(), ErrorKind::Validation);
    }
    assert!(server.requests().is_empty());
}

#[tokio::test]
async fn test_return_book_patches_status() {
    let server = MockServer::start().await;
    server.respond(
        Method::PATCH,
        "/book-borrow/8",
        200,
        json!({"id": 8, "bookId": 1, "userId": 2, "status": "RETURNED", "returnDate": "2024-03-01T10:00:00Z"}).to_string(),
    );

    let (session, _) = logged_in_session();
    let borrowing = assert_ok!(server.clients(session).borrowings.return_book(8).await);
    assert_eq!(borrowing.status, BorrowStatus::Returned);

    let request = &server.requests_to(&Method::PATCH, "/book-borrow/8")[0];
    assert_eq!(request.json(), json!({"status": "RETURNED"}));
}

#[tokio::test]
async fn test_assign_permissions_to_role() {
    let server = MockServer::start().await;
    server.respond(
        Method::POST,
        "/roles/2/permissions",
        201,
        json!({"id": 2, "name": "Librarian", "permissions": [{"id": 1, "name": "read"}, {"id": 4, "name": "lend"}]}).to_string(),
    );

    let (session, _) = logged_in_session();
    let role = assert_ok!(server.clients(session).roles.assign_permissions(2, &[1, 4]).await);
    assert_eq!(role.permission_ids(), vec![1, 4]);

    let request = &server.requests_to(&Method::POST, "/roles/2/permissions")[0];
    assert_eq!(request.json(), json!({"permissionIds": [1, 4]}));
}

#[tokio::test]
async fn test_current_user_normalises_role() {
    let server = MockServer::start().await;
    server.respond(
        Method::GET,
        "/users/me",
        200,
        json!({"id": 1, "email": "admin@library.test", "role": {"id": 1, "name": "Admin"}}).to_string(),
    );

    let (session, _) = logged_in_session();
    let me = assert_ok!(server.clients(session).roles.current_user().await);
    assert!(me.has_role("Admin"));
    assert_eq!(me.role_ids(), BTreeSet::from([1]));
}

#[tokio::test]
async fn test_assign_roles_is_sequential_and_fail_fast() {
    let server = MockServer::start().await;
    server.respond(Method::POST, "/users/5/role/1", 201, r#"{"userId":5,"roleId":1}"#);
    server.respond(Method::POST, "/users/5/role/2", 500, r#"{"message":"boom"}"#);
    server.respond(Method::POST, "/users/5/role/3", 201, "");

    let (session, _) = logged_in_session();
    let error = assert_err!(server.clients(session).users.assign_roles(5, &[1, 2, 3]).await);

    assert_eq!(error.applied, vec![RoleChange::Add(1)]);
    assert_eq!(error.failed, RoleChange::Add(2));
    assert_eq!(error.skipped, vec![RoleChange::Add(3)]);
    assert_eq!(error.source.status(), Some(500));
    assert!(!error.is_unauthorized());

    let paths: Vec<String> = server.requests().into_iter().map(|r| r.path).collect();
    assert_eq!(paths, vec!["/users/5/role/1", "/users/5/role/2"]);
}

#[tokio::test]
async fn test_assign_roles_collects_results_in_order() {
    let server = MockServer::start().await;
    server.respond(Method::POST, "/users/5/role/1", 201, r#"{"roleId":1}"#);
    server.respond(Method::POST, "/users/5/role/2", 201, "");

    let (session, _) = logged_in_session();
    let results = assert_ok!(server.clients(session).users.assign_roles(5, &[1, 2]).await);

    assert_eq!(results.len(), 2);
    assert_eq!(results[0].get("roleId"), Some(&json!(1)));
    assert!(results[1].is_empty());
}

#[tokio::test]
async fn test_update_roles_touches_only_the_difference() {
    let server = MockServer::start().await;
    server.respond(Method::DELETE, "/users/5/role/1", 200, "");
    server.respond(Method::POST, "/users/5/role/3", 201, "{}");

    let (session, _) = logged_in_session();
    let diff = assert_ok!(
        server
            .clients(session)
            .users
            .update_roles(5, &BTreeSet::from([1, 2]), &BTreeSet::from([2, 3]))
            .await
    );
    assert_eq!(diff.to_remove, vec![1]);
    assert_eq!(diff.to_add, vec![3]);

    let calls: Vec<(Method, String)> = server
        .requests()
        .into_iter()
        .map(|r| (r.method, r.path))
        .collect();
    assert_eq!(
        calls,
        vec![
            (Method::DELETE, "/users/5/role/1".to_string()),
            (Method::POST, "/users/5/role/3".to_string()),
        ]
    );
}

#[tokio::test]
async fn test_update_roles_stops_on_failed_removal() {
    let server = MockServer::start().await;
    server.respond(Method::DELETE, "/users/5/role/1", 401, "");

    let (session, _) = logged_in_session();
    let error = assert_err!(
        server
            .clients(session)
            .users
            .update_roles(5, &BTreeSet::from([1]), &BTreeSet::from([4]))
            .await
    );

    assert!(error.is_unauthorized());
    assert!(error.applied.is_empty());
    assert_eq!(error.failed, RoleChange::Remove(1));
    assert_eq!(error.skipped, vec![RoleChange::Add(4)]);
    assert_eq!(server.requests().len(), 1);
}

#[tokio::test]
async fn test_dashboard_loads_all_or_nothing() {
    let server = MockServer::start().await;
    server.respond(
        Method::GET,
        "/book",
        200,
        json!([{"id": 1, "title": "A", "author": "x", "totalCopies": 4, "availableQuantity": 3}]).to_string(),
    );
    server.respond(Method::GET, "/categories", 200, json!([{"id": 1, "name": "Science"}]).to_string());
    server.respond(
        Method::GET,
        "/book-borrow",
        200,
        json!([{"id": 1, "bookId": 1, "userId": 1, "dueDate": "2000-01-01", "status": "ACTIVE"}]).to_string(),
    );

    let (session, _) = logged_in_session();
    let api = server.clients(session);

    let summary = assert_ok!(DashboardSummary::load(&api).await);
    assert_eq!(summary.total_titles, 1);
    assert_eq!(summary.available_copies, 3);
    assert_eq!(summary.overdue_borrowings, 1);

    server.respond(Method::GET, "/categories", 503, "");
    let error = assert_err!(DashboardSummary::load(&api).await);
    assert_eq!(error.status(), Some(503));
}

#[tokio::test]
async fn test_rbac_snapshot_load() {
    let server = MockServer::start().await;
    server.respond(
        Method::GET,
        "/users",
        200,
        json!([{"id": 1, "email": "a@x.org", "roles": ["Admin"]}]).to_string(),
    );
    server.respond(
        Method::GET,
        "/roles",
        200,
        json!([{"id": 1, "name": "Admin", "permissions": ["read"]}]).to_string(),
    );
    server.respond(Method::GET, "/permissions", 200, json!([{"id": 1, "name": "read"}]).to_string());

    let (session, _) = logged_in_session();
    let snapshot = assert_ok!(RbacSnapshot::load(&server.clients(session)).await);
    assert_eq!(snapshot.users.len(), 1);
    assert_eq!(snapshot.roles_with_permission(&snapshot.permissions[0]).len(), 1);
}

#[tokio::test]
async fn test_users_list_surfaces_shape_mismatch() {
    let server = MockServer::start().await;
    server.respond(Method::GET, "/users", 200, json!([{"id": "u-1", "email": "a@b.org"}]).to_string());

    let (session, _) = logged_in_session();
    let error = assert_err!(server.clients(session).users.list().await);
    assert!(matches!(error, ClientError::Decode { .. }), "got {:?}", error);
}

#[tokio::test]
async fn test_users_list_tolerates_non_json_body() {
    let server = MockServer::start().await;
    server.respond(Method::GET, "/users", 200, "<html>maintenance</html>");

    let (session, _) = logged_in_session();
    let users = assert_ok!(server.clients(session).users.list().await);
    assert!(users.is_empty());
}

#[tokio::test]
async fn test_loose_timestamps_do_not_fail_the_list() {
    let server = MockServer::start().await;
    server.respond(
        Method::GET,
        "/categories",
        200,
        json!([
            {"id": 1, "name": "Sci", "createdAt": "2024-01-15T10:00:00"},
            {"id": 2, "name": "Art", "createdAt": 1705312800},
            {"id": 3, "name": "Law", "createdAt": "sometime"}
        ])
        .to_string(),
    );

    let (session, _) = logged_in_session();
    let categories = assert_ok!(server.clients(session).categories.list().await);
    assert_eq!(categories.len(), 3);
    assert_eq!(categories[0].created_at, categories[1].created_at);
    assert!(categories[0].created_at.is_some());
    assert_eq!(categories[2].created_at, None);
}
