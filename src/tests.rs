#[cfg(test)]
mod integration_tests {
    use crate::schemas::{ApiResponse, ErrorResponse};
    use crate::test_utils::test_utils::setup_test_server;
    use axum::http::StatusCode;
    use axum_test::{TestResponse, TestServer};
    use common::{FormView, HistoryRow, PortfolioView, QuoteView};
    use rust_decimal::Decimal;

    async fn register(server: &TestServer, username: &str, password: &str) -> TestResponse {
        server
            .post("/register")
            .form(&[
                ("username", username),
                ("password", password),
                ("confirmation", password),
            ])
            .await
    }

    async fn login(server: &TestServer, username: &str, password: &str) -> TestResponse {
        server
            .post("/login")
            .form(&[("username", username), ("password", password)])
            .await
    }

    async fn trade(server: &TestServer, path: &str, symbol: &str, shares: &str) -> TestResponse {
        server
            .post(path)
            .form(&[("symbol", symbol), ("shares", shares)])
            .await
    }

    async fn portfolio(server: &TestServer) -> PortfolioView {
        let response = server.get("/").await;
        response.assert_status(StatusCode::OK);
        response.json::<ApiResponse<PortfolioView>>().data
    }

    fn assert_redirect(response: &TestResponse, location: &str) {
        response.assert_status(StatusCode::SEE_OTHER);
        assert_eq!(response.header("location").to_str().unwrap(), location);
    }

    fn assert_apology(response: &TestResponse, message: &str) {
        response.assert_status(StatusCode::FORBIDDEN);
        let body: ErrorResponse = response.json();
        assert!(!body.success);
        assert_eq!(body.error, message);
    }

    #[tokio::test]
    async fn test_health_check() {
        let (server, _) = setup_test_server().await;

        let response = server.get("/health").await;

        response.assert_status(StatusCode::OK);
        let body: serde_json::Value = response.json();
        assert_eq!(body["status"], "healthy");
        assert_eq!(body["database"], "connected");
    }

    #[tokio::test]
    async fn test_protected_routes_redirect_to_login() {
        let (server, _) = setup_test_server().await;

        for path in ["/", "/history", "/quote", "/buy", "/sell", "/password"] {
            let response = server.get(path).await;
            assert_redirect(&response, "/login");
        }

        let response = trade(&server, "/buy", "AAPL", "1").await;
        assert_redirect(&response, "/login");
    }

    #[tokio::test]
    async fn test_register_logs_in_with_starting_cash() {
        let (server, _) = setup_test_server().await;

        let response = register(&server, "alice", "secret").await;
        assert_redirect(&response, "/");
        let cookie = response.header("set-cookie");
        assert!(cookie.to_str().unwrap().starts_with("session="));

        let view = portfolio(&server).await;
        assert!(view.rows.is_empty());
        assert_eq!(view.cash, Decimal::new(10_000, 0));
        assert_eq!(view.cash_usd, "$10,000.00");
        assert_eq!(view.total_value_usd, "$10,000.00");
    }

    #[tokio::test]
    async fn test_register_validation() {
        let (server, _) = setup_test_server().await;

        let response = server
            .post("/register")
            .form(&[("password", "pw"), ("confirmation", "pw")])
            .await;
        assert_apology(&response, "must provide username");

        let response = server
            .post("/register")
            .form(&[("username", "alice"), ("confirmation", "pw")])
            .await;
        assert_apology(&response, "must provide password");

        let response = server
            .post("/register")
            .form(&[("username", "alice"), ("password", "pw"), ("confirmation", "other")])
            .await;
        assert_apology(&response, "passwords do not match");

        // Nothing was created, so logging in fails.
        let response = login(&server, "alice", "pw").await;
        response.assert_status(StatusCode::FORBIDDEN);
    }

    #[tokio::test]
    async fn test_duplicate_username_is_rejected() {
        let (server, _) = setup_test_server().await;

        register(&server, "alice", "pw").await;
        server.get("/logout").await;

        let response = register(&server, "alice", "other").await;
        assert_apology(&response, "username is already taken");

        // Usernames are case-sensitive.
        let response = register(&server, "Alice", "other").await;
        assert_redirect(&response, "/");
    }

    #[tokio::test]
    async fn test_login_failures_are_indistinguishable() {
        let (server, _) = setup_test_server().await;
        register(&server, "alice", "secret").await;
        server.get("/logout").await;

        let unknown = login(&server, "bob", "secret").await;
        let wrong = login(&server, "alice", "wrong").await;

        unknown.assert_status(StatusCode::FORBIDDEN);
        wrong.assert_status(StatusCode::FORBIDDEN);
        let unknown: ErrorResponse = unknown.json();
        let wrong: ErrorResponse = wrong.json();
        assert_eq!(unknown.error, wrong.error);
        assert_eq!(unknown.code, wrong.code);
        assert_eq!(unknown.error, "invalid username and/or password");

        let response = server.get("/").await;
        assert_redirect(&response, "/login");
    }

    #[tokio::test]
    async fn test_login_and_logout() {
        let (server, _) = setup_test_server().await;
        register(&server, "alice", "secret").await;

        let response = server.get("/logout").await;
        assert_redirect(&response, "/");
        assert_redirect(&server.get("/").await, "/login");

        let response = login(&server, "alice", "secret").await;
        assert_redirect(&response, "/");
        server.get("/").await.assert_status(StatusCode::OK);
    }

    #[tokio::test]
    async fn test_buy_then_sell_after_price_change() {
        let (server, quotes) = setup_test_server().await;
        register(&server, "alice", "pw").await;

        let response = trade(&server, "/buy", "AAPL", "10").await;
        assert_redirect(&response, "/");

        let view = portfolio(&server).await;
        assert_eq!(view.cash_usd, "$8,500.00");
        assert_eq!(view.rows.len(), 1);
        assert_eq!(view.rows[0].symbol, "AAPL");
        assert_eq!(view.rows[0].shares, 10);
        assert_eq!(view.total_value_usd, "$10,000.00");

        quotes.set_price("AAPL", Decimal::new(160, 0));

        let response = trade(&server, "/sell", "AAPL", "10").await;
        assert_redirect(&response, "/");

        let view = portfolio(&server).await;
        assert!(view.rows.is_empty());
        assert_eq!(view.cash_usd, "$10,100.00");

        let response = server.get("/history").await;
        response.assert_status(StatusCode::OK);
        let rows = response.json::<ApiResponse<Vec<HistoryRow>>>().data;
        assert_eq!(rows.len(), 2);
        assert_eq!((rows[0].method.as_str(), rows[0].shares), ("Buy", 10));
        assert_eq!(rows[0].price_usd, "$150.00");
        assert_eq!((rows[1].method.as_str(), rows[1].shares), ("Sell", -10));
        assert_eq!(rows[1].price_usd, "$160.00");
    }

    #[tokio::test]
    async fn test_buy_rejects_invalid_shares() {
        let (server, _) = setup_test_server().await;
        register(&server, "alice", "pw").await;

        for shares in ["abc", "0", "-3", "1.5"] {
            let response = trade(&server, "/buy", "AAPL", shares).await;
            assert_apology(&response, "must provide valid number of shares");
        }

        let response = server.post("/buy").form(&[("symbol", "AAPL")]).await;
        assert_apology(&response, "must provide number of shares");

        let view = portfolio(&server).await;
        assert!(view.rows.is_empty());
        assert_eq!(view.cash_usd, "$10,000.00");
    }

    #[tokio::test]
    async fn test_malformed_form_posts_get_apology() {
        let (server, _) = setup_test_server().await;
        register(&server, "alice", "pw").await;

        let response = server.post("/buy").await;
        assert_apology(&response, "invalid form submission");

        let response = server
            .post("/sell")
            .text("symbol=AAPL&shares=1")
            .await;
        assert_apology(&response, "invalid form submission");

        let response = server
            .post("/buy")
            .bytes("symbol=AAPL&symbol=MSFT&shares=1".into())
            .content_type("application/x-www-form-urlencoded")
            .await;
        assert_apology(&response, "invalid form submission");

        let view = portfolio(&server).await;
        assert!(view.rows.is_empty());
        assert_eq!(view.cash_usd, "$10,000.00");
    }

    #[tokio::test]
    async fn test_buy_unknown_symbol() {
        let (server, _) = setup_test_server().await;
        register(&server, "alice", "pw").await;

        let response = trade(&server, "/buy", "ZZZZ", "1").await;
        assert_apology(&response, "must provide valid stock symbol");
    }

    #[tokio::test]
    async fn test_buy_insufficient_funds() {
        let (server, _) = setup_test_server().await;
        register(&server, "alice", "pw").await;

        // 67 x 150 = 10050 > 10000
        let response = trade(&server, "/buy", "AAPL", "67").await;
        assert_apology(&response, "insufficient funds");

        let view = portfolio(&server).await;
        assert!(view.rows.is_empty());
        assert_eq!(view.cash_usd, "$10,000.00");

        let rows = server.get("/history").await.json::<ApiResponse<Vec<HistoryRow>>>().data;
        assert!(rows.is_empty());
    }

    #[tokio::test]
    async fn test_sell_more_than_held() {
        let (server, _) = setup_test_server().await;
        register(&server, "alice", "pw").await;
        trade(&server, "/buy", "MSFT", "2").await;

        let response = trade(&server, "/sell", "MSFT", "3").await;
        assert_apology(&response, "must provide valid number of shares");

        let response = trade(&server, "/sell", "AAPL", "1").await;
        assert_apology(&response, "must provide valid stock symbol");

        let view = portfolio(&server).await;
        assert_eq!(view.rows[0].shares, 2);
        assert_eq!(view.cash_usd, "$9,500.00");
    }

    #[tokio::test]
    async fn test_sell_form_lists_holdings() {
        let (server, _) = setup_test_server().await;
        register(&server, "alice", "pw").await;
        trade(&server, "/buy", "MSFT", "2").await;
        trade(&server, "/buy", "AAPL", "1").await;

        let response = server.get("/sell").await;
        response.assert_status(StatusCode::OK);
        let form = response.json::<ApiResponse<FormView>>().data;
        assert_eq!(form.form, "sell");
        let symbols: Vec<_> = form.holdings.iter().map(|h| h.symbol.as_str()).collect();
        assert_eq!(symbols, vec!["AAPL", "MSFT"]);
    }

    #[tokio::test]
    async fn test_quote_lookup() {
        let (server, _) = setup_test_server().await;
        register(&server, "alice", "pw").await;

        let response = server.post("/quote").form(&[("symbol", "aapl")]).await;
        response.assert_status(StatusCode::OK);
        let view = response.json::<ApiResponse<QuoteView>>().data;
        assert_eq!(view.symbol, "AAPL");
        assert_eq!(view.name, "Apple Inc.");
        assert_eq!(view.price_usd, "$150.00");

        let response = server.post("/quote").form(&[("symbol", "NOPE")]).await;
        assert_apology(&response, "invalid stock symbol");

        let response = server.post("/quote").form(&[("symbol", "  ")]).await;
        assert_apology(&response, "must provide stock symbol");
    }

    #[tokio::test]
    async fn test_portfolio_survives_unavailable_quote() {
        let (server, quotes) = setup_test_server().await;
        register(&server, "alice", "pw").await;
        trade(&server, "/buy", "AAPL", "1").await;
        quotes.set_unavailable("AAPL", true);

        let view = portfolio(&server).await;
        assert_eq!(view.rows.len(), 1);
        assert!(view.rows[0].price.is_none());
        assert_eq!(view.total_value_usd, "$9,850.00");
    }

    #[tokio::test]
    async fn test_password_change_ends_session() {
        let (server, _) = setup_test_server().await;
        register(&server, "alice", "old").await;

        let response = server
            .post("/password")
            .form(&[("oldpass", "wrong"), ("newpass", "new"), ("confirm", "new")])
            .await;
        assert_apology(&response, "old password incorrect");

        let response = server
            .post("/password")
            .form(&[("oldpass", "old"), ("newpass", "new"), ("confirm", "nope")])
            .await;
        assert_apology(&response, "new passwords do not match");

        let response = server
            .post("/password")
            .form(&[("oldpass", "old"), ("newpass", "new"), ("confirm", "new")])
            .await;
        assert_redirect(&response, "/login");
        assert_redirect(&server.get("/").await, "/login");

        login(&server, "alice", "old").await.assert_status(StatusCode::FORBIDDEN);
        assert_redirect(&login(&server, "alice", "new").await, "/");
    }

    #[tokio::test]
    async fn test_responses_are_not_cached() {
        let (server, _) = setup_test_server().await;

        for response in [server.get("/login").await, server.get("/").await] {
            assert_eq!(
                response.header("cache-control").to_str().unwrap(),
                "no-cache, no-store, must-revalidate"
            );
            assert_eq!(response.header("expires").to_str().unwrap(), "0");
            assert_eq!(response.header("pragma").to_str().unwrap(), "no-cache");
        }
    }

    #[tokio::test]
    async fn test_unknown_route_is_not_found() {
        let (server, _) = setup_test_server().await;

        let response = server.get("/nowhere").await;
        response.assert_status(StatusCode::NOT_FOUND);
        let body: ErrorResponse = response.json();
        assert_eq!(body.code, "ROUTE_NOT_FOUND");
    }
}
