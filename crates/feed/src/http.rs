use async_trait::async_trait;
use reqwest::Client;
use rust_decimal::Decimal;
use serde::Deserialize;
use std::time::{Duration, Instant};
use tracing::debug;
use tzarfat_core::analytics::entity::{
    AnalyticsSnapshot, Asset, PortfolioSnapshot, Summary, TopHolding, Trade,
};
use tzarfat_core::analytics::error::FetchError;
use tzarfat_core::analytics::port::SnapshotSource;
use tzarfat_core::config::FeedConfig;

/// # Summary
/// 基于 HTTP GET 的分析数据源实现。
///
/// # Invariants
/// - 使用 `reqwest` 异步客户端进行通讯。
/// - 只做一次请求，不持有任何快照状态。
#[derive(Clone)]
pub struct HttpSnapshotSource {
    /// 内部使用的 HTTP 客户端
    client: Client,
    /// 固定的数据端点
    endpoint: String,
}

impl HttpSnapshotSource {
    /// # Summary
    /// 根据数据源配置创建实例。
    ///
    /// # Logic
    /// 1. 安装 ring 加密后端 (已安装则跳过)。
    /// 2. 配置请求超时与 User-Agent。
    /// 3. 初始化 reqwest 客户端。
    ///
    /// # Arguments
    /// * `config`: 数据源配置。
    ///
    /// # Returns
    /// 成功返回数据源，客户端构建失败返回 reqwest 错误。
    pub fn new(config: &FeedConfig) -> Result<Self, reqwest::Error> {
        if rustls::crypto::ring::default_provider()
            .install_default()
            .is_err()
        {
            debug!("rustls crypto provider already installed");
        }

        let client = Client::builder()
            .timeout(Duration::from_secs(config.timeout_secs))
            .user_agent(config.user_agent.clone())
            .build()?;

        Ok(Self {
            client,
            endpoint: config.endpoint.clone(),
        })
    }

    /// 当前请求的端点地址。
    pub fn endpoint(&self) -> &str {
        &self.endpoint
    }
}

#[async_trait]
impl SnapshotSource for HttpSnapshotSource {
    /// # Summary
    /// 请求端点并解析出完整快照。
    ///
    /// # Logic
    /// 1. 发起 GET 请求，传输层失败映射为 `Network`。
    /// 2. 非 2xx 状态码映射为 `HttpStatus`。
    /// 3. 读取响应体并交给 `parse_snapshot` 做结构与取值校验。
    ///
    /// # Returns
    /// 成功返回快照，失败返回 `FetchError`。
    async fn fetch_snapshot(&self) -> Result<AnalyticsSnapshot, FetchError> {
        let started = Instant::now();

        let resp = self
            .client
            .get(&self.endpoint)
            .send()
            .await
            .map_err(|e| FetchError::Network(e.to_string()))?;

        let status = resp.status();
        if !status.is_success() {
            return Err(FetchError::HttpStatus(status.as_u16()));
        }

        let body = resp
            .bytes()
            .await
            .map_err(|e| FetchError::Network(e.to_string()))?;

        let snapshot = parse_snapshot(&body)?;
        debug!(
            "Fetched snapshot from {} in {:?}: {} trades, {} periods, {} assets, {} holdings",
            self.endpoint,
            started.elapsed(),
            snapshot.trades.len(),
            snapshot.portfolio.len(),
            snapshot.assets.len(),
            snapshot.top_holdings.len()
        );
        Ok(snapshot)
    }
}

/// # Summary
/// 接口响应顶层结构。
///
/// # Invariants
/// - 字段名大小写敏感；多余字段忽略；缺少任一字段则整体失败。
#[derive(Deserialize, Debug)]
struct WireSnapshot {
    trades: Vec<WireTrade>,
    portfolio: Vec<WirePortfolio>,
    assets: Vec<WireAsset>,
    #[serde(rename = "topHoldings")]
    top_holdings: Vec<WireHolding>,
    summary: WireSummary,
}

#[derive(Deserialize, Debug)]
struct WireTrade {
    id: i64,
    ticker: String,
    trade_type: String,
    // 先按有符号整数读取，便于给出明确的校验错误
    quantity: i64,
    price: Decimal,
    total: Decimal,
    time: String,
}

#[derive(Deserialize, Debug)]
struct WirePortfolio {
    month: String,
    value: Decimal,
    profit: Decimal,
}

#[derive(Deserialize, Debug)]
struct WireAsset {
    asset: String,
    percent: Decimal,
    value: Decimal,
}

#[derive(Deserialize, Debug)]
struct WireHolding {
    ticker: String,
    name: String,
    change: String,
    value: Decimal,
    #[serde(default)]
    sector: Option<String>,
}

#[derive(Deserialize, Debug)]
struct WireSummary {
    #[serde(rename = "totalAssets")]
    total_assets: Decimal,
    #[serde(rename = "totalProfit")]
    total_profit: Decimal,
    #[serde(rename = "todayTrades")]
    today_trades: u64,
}

/// # Summary
/// 将原始响应体解析并校验为领域快照。
///
/// # Logic
/// 1. 反序列化为接口结构，缺字段或类型不符即失败。
/// 2. 逐条校验取值：成交数量与价格为正，配置占比位于 0..=100。
/// 3. 全部通过后才转换为领域实体，任何一处失败都整体拒绝。
///
/// # Arguments
/// * `body`: 响应体字节。
///
/// # Returns
/// 成功返回快照，失败返回 `FetchError::Parse`。
pub fn parse_snapshot(body: &[u8]) -> Result<AnalyticsSnapshot, FetchError> {
    let wire: WireSnapshot =
        serde_json::from_slice(body).map_err(|e| FetchError::Parse(e.to_string()))?;
    wire.into_snapshot()
}

impl WireSnapshot {
    fn into_snapshot(self) -> Result<AnalyticsSnapshot, FetchError> {
        let trades = self
            .trades
            .into_iter()
            .enumerate()
            .map(|(i, t)| t.into_trade(i))
            .collect::<Result<Vec<_>, _>>()?;

        let assets = self
            .assets
            .into_iter()
            .enumerate()
            .map(|(i, a)| a.into_asset(i))
            .collect::<Result<Vec<_>, _>>()?;

        let portfolio = self
            .portfolio
            .into_iter()
            .map(|p| PortfolioSnapshot {
                period: p.month,
                value: p.value,
                profit: p.profit,
            })
            .collect();

        let top_holdings = self
            .top_holdings
            .into_iter()
            .map(|h| TopHolding {
                ticker: h.ticker,
                name: h.name,
                change: h.change,
                value: h.value,
                sector: h.sector,
            })
            .collect();

        Ok(AnalyticsSnapshot {
            trades,
            portfolio,
            assets,
            top_holdings,
            summary: Summary {
                total_assets: self.summary.total_assets,
                total_profit: self.summary.total_profit,
                today_trades: self.summary.today_trades,
            },
        })
    }
}

impl WireTrade {
    fn into_trade(self, index: usize) -> Result<Trade, FetchError> {
        let quantity = u64::try_from(self.quantity)
            .ok()
            .filter(|q| *q > 0)
            .ok_or_else(|| {
                FetchError::Parse(format!(
                    "trades[{}].quantity must be positive, got {}",
                    index, self.quantity
                ))
            })?;

        if self.price <= Decimal::ZERO {
            return Err(FetchError::Parse(format!(
                "trades[{}].price must be positive, got {}",
                index, self.price
            )));
        }

        Ok(Trade {
            id: self.id,
            ticker: self.ticker,
            trade_type: self.trade_type,
            quantity,
            price: self.price,
            total: self.total,
            time: self.time,
        })
    }
}

impl WireAsset {
    fn into_asset(self, index: usize) -> Result<Asset, FetchError> {
        if self.percent < Decimal::ZERO || self.percent > Decimal::ONE_HUNDRED {
            return Err(FetchError::Parse(format!(
                "assets[{}].percent out of range 0..=100, got {}",
                index, self.percent
            )));
        }
        Ok(Asset {
            asset: self.asset,
            percent: self.percent,
            value: self.value,
        })
    }
}
