use yew::prelude::*;
use yew_router::prelude::*;

use crate::dashboard::Card;
use crate::tools::ear_trainer::{load_setup, EarTrainer};

// 애플리케이션의 라우트 정의
#[derive(Clone, Routable, PartialEq)]
pub enum Route {
    #[at("/")]
    Home,
    #[not_found]
    #[at("/404")]
    NotFound,
}

// 네비게이션 바 컴포넌트
#[function_component(Navbar)]
pub fn navbar() -> Html {
    html! {
        <nav class="navbar">
            <div class="navbar-container">
                <Link<Route> classes={classes!("navbar-title")} to={Route::Home}>
                    {"🎵 청음 트레이너"}
                </Link<Route>>
            </div>
        </nav>
    }
}

// 설정을 읽어 트레이너를 띄우는 페이지
#[function_component(TrainerPage)]
pub fn trainer_page() -> Html {
    let setup = use_memo((), |_| {
        let setup = load_setup();
        if let Err(err) = &setup {
            log::error!("설정 오류: {}", err);
        }
        setup
    });

    match &*setup {
        Ok((config, pool)) => html! {
            <EarTrainer config={config.clone()} pool={pool.clone()} />
        },
        Err(err) => html! {
            <Card title="설정 오류">
                <p class="config-error">{ err.to_string() }</p>
            </Card>
        },
    }
}

#[function_component(NotFound)]
pub fn not_found() -> Html {
    html! {
        <div class="detail-page">
            <Link<Route> to={Route::Home}>{"🏠 Back to Home"}</Link<Route>>
        </div>
    }
}

pub fn switch(route: Route) -> Html {
    // 현재 라우트에 따른 컨텐츠 선택
    let content = match route {
        Route::Home => html! { <TrainerPage /> },
        Route::NotFound => html! { <NotFound /> },
    };

    html! {
        <>
            <Navbar />
            <div class="app-container">
                { content }
            </div>
        </>
    }
}
