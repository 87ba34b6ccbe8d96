use yew::prelude::*;

/// 제목이 있는 카드 컴포넌트 속성
#[derive(Properties, PartialEq)]
pub struct CardProps {
    pub title: String,
    #[prop_or_default]
    pub children: Children,
}

#[function_component(Card)]
pub fn card(props: &CardProps) -> Html {
    html! {
        <div class="dashboard-card">
            <div class="dashboard-card-header">
                <h3>{ &props.title }</h3>
            </div>
            <div class="dashboard-card-content">
                { for props.children.iter() }
            </div>
        </div>
    }
}

/// 통계 한 칸 (이름 + 값)
#[derive(Properties, PartialEq)]
pub struct StatTileProps {
    pub label: AttrValue,
    pub value: AttrValue,
    #[prop_or_default]
    pub kind: AttrValue, // CSS 색상 구분용
}

#[function_component(StatTile)]
pub fn stat_tile(props: &StatTileProps) -> Html {
    html! {
        <div class={classes!("stat-tile", props.kind.to_string())}>
            <span class="stat-label">{ props.label.to_string() }</span>
            <span class="stat-value">{ props.value.to_string() }</span>
        </div>
    }
}
