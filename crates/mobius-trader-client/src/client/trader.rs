//! The MobiusTrader API client.

use std::collections::BTreeMap;

use async_trait::async_trait;
use serde::de::DeserializeOwned;
use serde::Serialize;
use serde_json::{json, Map, Value};

use mobius_trader::{
    parse_expr, AccountNumberType, CurrencyInfo, ExprTree, LookupKey, MetadataTables,
    QueryBuilder, RemoteCall, SelectItem, SymbolInfo,
};

use crate::config::ClientConfig;
use crate::transport::{http::post_json, HttpTransport, RpcTransport};
use crate::types::*;

/// Client bound to one broker.
///
/// Symbol and currency tables are fetched once by [`MobiusTrader::init`]
/// and then used for lookups and fixed-point conversion.
pub struct MobiusTrader<T: RpcTransport = HttpTransport> {
    config: ClientConfig,
    transport: T,
    tables: MetadataTables,
    loaded: bool,
}

impl MobiusTrader<HttpTransport> {
    /// Validate `config`, open an HTTP transport and load the metadata
    /// tables.
    pub async fn connect(config: ClientConfig) -> ClientResult<Self> {
        config.validate()?;
        let transport = HttpTransport::new(&config)?;
        let mut client = Self::with_transport(config, transport);
        client.init().await?;
        Ok(client)
    }
}

impl<T: RpcTransport> MobiusTrader<T> {
    /// A client over an existing transport. Call [`MobiusTrader::init`]
    /// before using symbol or currency lookups.
    pub fn with_transport(config: ClientConfig, transport: T) -> Self {
        Self {
            config,
            transport,
            tables: MetadataTables::default(),
            loaded: false,
        }
    }

    /// Load the symbol and currency tables. Later calls are no-ops.
    pub async fn init(&mut self) -> ClientResult<()> {
        if self.loaded {
            return Ok(());
        }

        let symbols: Vec<SymbolInfo> = self.call_as("SymbolsGet", json!({})).await?;
        let currencies: Vec<CurrencyInfo> = self.call_as("CurrenciesGet", json!({})).await?;

        tracing::info!(
            "Broker {}: loaded {} symbols and {} currencies",
            self.config.broker_id,
            symbols.len(),
            currencies.len()
        );

        self.tables = MetadataTables::new(symbols, currencies);
        self.loaded = true;
        Ok(())
    }

    pub fn config(&self) -> &ClientConfig {
        &self.config
    }

    pub fn broker_id(&self) -> u64 {
        self.config.broker_id
    }

    // ─── Raw calls ───────────────────────────────────────

    /// Invoke an API method by name.
    pub async fn call(&self, method: &str, params: Value) -> ClientResult<Value> {
        tracing::debug!("call {method}");
        self.transport.request(method, params).await
    }

    async fn call_with<P: Serialize>(&self, method: &str, params: &P) -> ClientResult<Value> {
        self.call(method, serde_json::to_value(params)?).await
    }

    async fn call_as<R: DeserializeOwned>(&self, method: &str, params: Value) -> ClientResult<R> {
        let result = self.call(method, params).await?;
        Ok(serde_json::from_value(result)?)
    }

    // ─── Search ──────────────────────────────────────────

    /// Start a search selecting `columns`. An empty list selects the
    /// default order columns.
    pub fn search<I, S>(&self, columns: I) -> QueryBuilder
    where
        I: IntoIterator<Item = S>,
        S: Into<SelectItem>,
    {
        QueryBuilder::with_columns(columns)
    }

    /// Parse a computed-column expression.
    pub fn expr(&self, expression: &str) -> ClientResult<ExprTree> {
        Ok(parse_expr(expression)?)
    }

    // ─── Metadata and conversions ────────────────────────

    pub fn symbols(&self) -> &[SymbolInfo] {
        &self.tables.symbols
    }

    pub fn symbol(&self, key: impl Into<LookupKey>) -> ClientResult<&SymbolInfo> {
        let key = key.into();
        self.tables
            .symbol(&key)
            .ok_or(ClientError::SymbolNotFound(key))
    }

    pub fn currencies(&self) -> &[CurrencyInfo] {
        &self.tables.currencies
    }

    pub fn currency(&self, key: impl Into<LookupKey>) -> ClientResult<&CurrencyInfo> {
        let key = key.into();
        self.tables
            .currency(&key)
            .ok_or(ClientError::CurrencyNotFound(key))
    }

    pub fn price_from_int(&self, symbol: impl Into<LookupKey>, price: i64) -> ClientResult<f64> {
        let key = symbol.into();
        self.tables
            .price_from_int(&key, price)
            .ok_or(ClientError::SymbolNotFound(key))
    }

    pub fn price_to_int(&self, symbol: impl Into<LookupKey>, price: f64) -> ClientResult<i64> {
        let key = symbol.into();
        self.tables
            .price_to_int(&key, price)
            .ok_or(ClientError::SymbolNotFound(key))
    }

    pub fn volume_from_int(&self, symbol: impl Into<LookupKey>, volume: i64) -> ClientResult<f64> {
        let key = symbol.into();
        self.margin_currency_checked(&key)?;
        self.tables
            .volume_from_int(&key, volume)
            .ok_or(ClientError::SymbolNotFound(key))
    }

    pub fn volume_to_int(&self, symbol: impl Into<LookupKey>, volume: f64) -> ClientResult<i64> {
        let key = symbol.into();
        self.margin_currency_checked(&key)?;
        self.tables
            .volume_to_int(&key, volume)
            .ok_or(ClientError::SymbolNotFound(key))
    }

    pub fn deposit_from_int(
        &self,
        currency: impl Into<LookupKey>,
        amount: i64,
    ) -> ClientResult<f64> {
        let key = currency.into();
        self.tables
            .deposit_from_int(&key, amount)
            .ok_or(ClientError::CurrencyNotFound(key))
    }

    pub fn deposit_to_int(
        &self,
        currency: impl Into<LookupKey>,
        amount: f64,
    ) -> ClientResult<i64> {
        let key = currency.into();
        self.tables
            .deposit_to_int(&key, amount)
            .ok_or(ClientError::CurrencyNotFound(key))
    }

    /// Distinguish an unknown symbol from an unknown margin currency.
    fn margin_currency_checked(&self, symbol: &LookupKey) -> ClientResult<()> {
        let info = self.symbol(symbol.clone())?;
        self.currency(LookupKey::ById(info.margin_currency_id))?;
        Ok(())
    }

    // ─── Quotes and accounts ─────────────────────────────

    pub async fn quotes(&self, symbols: &[&str]) -> ClientResult<Value> {
        let params = QuotesParams {
            symbols: symbols.iter().map(|s| s.to_string()).collect(),
        };
        self.call_with("SymbolQuotesGet", &params).await
    }

    pub async fn account(&self, id: i64) -> ClientResult<Value> {
        self.call_with("AccountGet", &IdParams { id }).await
    }

    pub async fn account_number(&self, id: i64) -> ClientResult<Value> {
        self.call_with("AccountNumberGet", &IdParams { id }).await
    }

    pub async fn account_numbers(&self, account_id: i64) -> ClientResult<Vec<Value>> {
        let result = self
            .call_with("AccountNumbersGet", &IdParams { id: account_id })
            .await?;
        Ok(serde_json::from_value(result)?)
    }

    /// Withdrawable money summed over the account's real account numbers,
    /// expressed in `currency`.
    pub async fn account_balance(&self, account_id: i64, currency: &str) -> ClientResult<f64> {
        let real = i64::from(AccountNumberType::Real);
        let ids: Vec<i64> = self
            .account_numbers(account_id)
            .await?
            .iter()
            .filter(|n| n.get("Type").and_then(Value::as_i64) == Some(real))
            .filter_map(|n| n.get("Id").and_then(Value::as_i64))
            .collect();

        let money = self.money_info(&ids, Some(currency)).await?;

        let mut balance = 0.0;
        for id in &ids {
            let info = money.get(&id.to_string()).ok_or_else(|| {
                ClientError::UnexpectedResponse(format!("MoneyInfo lacks account number {id}"))
            })?;
            balance += info.withdrawable();
        }
        Ok(balance)
    }

    pub async fn create_account(&self, account: &NewAccount) -> ClientResult<Value> {
        self.call_with("AccountCreate", account).await
    }

    pub async fn create_account_number(&self, number: &NewAccountNumber) -> ClientResult<Value> {
        self.call_with("AccountNumberCreate", number).await
    }

    // ─── Passwords ───────────────────────────────────────

    pub async fn password_set(
        &self,
        account_id: i64,
        login: &str,
        password: &str,
    ) -> ClientResult<Value> {
        let params = PasswordSetParams {
            account_id,
            login: Value::from(login),
            password: password.to_string(),
            session_type: SESSION_TYPE_TRADER,
        };
        self.call_with("PasswordSet", &params).await
    }

    pub async fn password_check(&self, login: &str, password: &str) -> ClientResult<Value> {
        let params = PasswordCheckParams {
            login: Value::from(login),
            password: password.to_string(),
            session_type: SESSION_TYPE_TRADER,
        };
        self.call_with("PasswordCheck", &params).await
    }

    /// The withdrawal password uses the account id as its login.
    pub async fn withdraw_password_set(
        &self,
        account_id: i64,
        password: &str,
    ) -> ClientResult<Value> {
        let params = PasswordSetParams {
            account_id,
            login: Value::from(account_id),
            password: password.to_string(),
            session_type: SESSION_TYPE_WITHDRAW,
        };
        self.call_with("PasswordSet", &params).await
    }

    pub async fn withdraw_password_check(
        &self,
        account_id: i64,
        password: &str,
    ) -> ClientResult<Value> {
        let params = PasswordCheckParams {
            login: Value::from(account_id),
            password: password.to_string(),
            session_type: SESSION_TYPE_WITHDRAW,
        };
        self.call_with("PasswordCheck", &params).await
    }

    // ─── Money ───────────────────────────────────────────

    /// Money state of several account numbers, keyed by account number id.
    pub async fn money_info(
        &self,
        account_numbers: &[i64],
        currency: Option<&str>,
    ) -> ClientResult<BTreeMap<String, MoneyInfo>> {
        let params = MoneyInfoParams {
            account_numbers: account_numbers.to_vec(),
            currency: currency.map(str::to_string),
        };
        let result = self.call_with("MoneyInfo", &params).await?;
        Ok(serde_json::from_value(result)?)
    }

    /// Money state of a single account number.
    pub async fn money_info_one(&self, account_number_id: i64) -> ClientResult<MoneyInfo> {
        let mut all = self.money_info(&[account_number_id], None).await?;
        all.remove(&account_number_id.to_string()).ok_or_else(|| {
            ClientError::UnexpectedResponse(format!(
                "MoneyInfo lacks account number {account_number_id}"
            ))
        })
    }

    /// Returns the ticket of the balance operation, if one was created.
    pub async fn balance_add(
        &self,
        account_number_id: i64,
        amount: i64,
        comment: &str,
    ) -> ClientResult<Option<i64>> {
        self.ticket_operation("BalanceAdd", account_number_id, amount, comment)
            .await
    }

    pub async fn bonus_add(
        &self,
        account_number_id: i64,
        amount: i64,
        comment: &str,
    ) -> ClientResult<Option<i64>> {
        self.ticket_operation("BonusAdd", account_number_id, amount, comment)
            .await
    }

    pub async fn credit_add(
        &self,
        account_number_id: i64,
        amount: i64,
        comment: &str,
    ) -> ClientResult<Option<i64>> {
        self.ticket_operation("CreditAdd", account_number_id, amount, comment)
            .await
    }

    async fn ticket_operation(
        &self,
        method: &str,
        account_number_id: i64,
        amount: i64,
        comment: &str,
    ) -> ClientResult<Option<i64>> {
        let params = BalanceParams {
            account_number_id,
            amount,
            comment: comment.to_string(),
        };
        let result = self.call_with(method, &params).await?;
        Ok(ticket_of(&result))
    }

    /// Credit a deposit. `amount` is in the currency's integer units.
    pub async fn funds_deposit(
        &self,
        currency: impl Into<LookupKey>,
        account_number_id: i64,
        amount: i64,
        pay_system_code: &str,
        purse: &str,
    ) -> ClientResult<Option<i64>> {
        let comment = self.funds_comment("DP", currency.into(), amount, pay_system_code, purse)?;
        self.balance_add(account_number_id, amount, &comment).await
    }

    /// Debit a withdrawal after checking the account can cover it.
    pub async fn funds_withdraw(
        &self,
        currency: impl Into<LookupKey>,
        account_number_id: i64,
        amount: i64,
        pay_system_code: &str,
        purse: &str,
    ) -> ClientResult<Option<i64>> {
        let comment = self.funds_comment("WD", currency.into(), amount, pay_system_code, purse)?;

        let money = self.money_info_one(account_number_id).await?;
        if money.withdrawable() < amount as f64 {
            return Err(ClientError::NotEnoughMoney {
                available: money.withdrawable(),
                requested: amount,
            });
        }

        self.balance_add(account_number_id, -amount, &comment).await
    }

    fn funds_comment(
        &self,
        prefix: &str,
        currency: LookupKey,
        amount: i64,
        pay_system_code: &str,
        purse: &str,
    ) -> ClientResult<String> {
        let display = self.deposit_from_int(currency, amount)?;
        Ok(format!("{prefix} {pay_system_code} {display} {purse}")
            .trim()
            .to_string())
    }

    // ─── Orders ──────────────────────────────────────────

    pub async fn order_open(&self, order: &OrderOpen) -> ClientResult<Value> {
        self.call_with("AdminOpenOrder", order).await
    }

    /// Change an order. `changes` may hold Volume, Sl, Tp, OpenPrice,
    /// ClosePrice, Comment and UserData.
    pub async fn order_modify(
        &self,
        ticket: i64,
        changes: Map<String, Value>,
    ) -> ClientResult<Value> {
        self.call("AdminModifyOrder", with_ticket(ticket, changes)).await
    }

    /// Close an order. `changes` may hold Volume and Price.
    pub async fn order_close(
        &self,
        ticket: i64,
        changes: Map<String, Value>,
    ) -> ClientResult<Value> {
        self.call("AdminCloseOrder", with_ticket(ticket, changes)).await
    }

    pub async fn order_delete(&self, ticket: i64) -> ClientResult<Value> {
        self.call("AdminDeleteOrder", json!({ "Ticket": ticket })).await
    }

    // ─── Trader terminal ─────────────────────────────────

    /// Obtain a terminal JWT for a trader's credentials.
    pub async fn trader_auth(
        &self,
        login: &str,
        password: &str,
        ip: &str,
        agent: &str,
    ) -> ClientResult<String> {
        let base = self
            .config
            .terminal_url
            .as_deref()
            .ok_or_else(|| ClientError::Config("terminal_url is not set".to_string()))?;
        let url = format!("{}/get-jwt", base.trim_end_matches('/'));

        let params = TraderAuthParams {
            login: login.to_string(),
            password: password.to_string(),
            ip: ip.to_string(),
            agent: agent.to_string(),
        };
        let reply: TraderAuthResult = post_json(&url, &params, self.config.timeout_ms).await?;

        match (reply.jwt, reply.error) {
            (_, Some(error)) if !error.is_null() => Err(ClientError::Auth(match error {
                Value::String(s) => s,
                other => other.to_string(),
            })),
            (Some(jwt), _) => Ok(jwt),
            (None, _) => Err(ClientError::UnexpectedResponse(
                "terminal reply carries no jwt".to_string(),
            )),
        }
    }
}

fn with_ticket(ticket: i64, mut changes: Map<String, Value>) -> Value {
    changes.insert("Ticket".to_string(), Value::from(ticket));
    Value::Object(changes)
}

#[async_trait]
impl<T: RpcTransport> RemoteCall for MobiusTrader<T> {
    type Error = ClientError;

    async fn call(&self, method: &str, params: Value) -> ClientResult<Value> {
        MobiusTrader::call(self, method, params).await
    }
}
