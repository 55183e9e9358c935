/// Локальная постраничная разбивка таблицы занятий.
///
/// Номера страниц считаются с единицы; переход на несуществующую страницу -
/// no-op, кнопки по краям отключаются в экране.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Pager {
    pub page: usize,
    pub per_page: usize,
    pub total: usize,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PageItem {
    Page(usize),
    Ellipsis,
}

const MAX_VISIBLE: usize = 5;

impl Pager {
    pub fn new(total: usize, per_page: usize) -> Self {
        Self { page: 1, per_page, total }
    }

    pub fn pages(&self) -> usize {
        if self.total == 0 || self.per_page == 0 {
            1
        } else {
            self.total.div_ceil(self.per_page)
        }
    }

    /// Сбрасывает счётчик под новый список, оставаясь на первой странице.
    pub fn reset(&mut self, total: usize) {
        self.total = total;
        self.page = 1;
    }

    pub fn set_page(&mut self, page: usize) {
        if page >= 1 && page <= self.pages() {
            self.page = page;
        }
    }

    pub fn has_prev(&self) -> bool {
        self.page > 1
    }

    pub fn has_next(&self) -> bool {
        self.page < self.pages()
    }

    /// Срез текущей страницы.
    pub fn slice<'a, T>(&self, items: &'a [T]) -> &'a [T] {
        let from = (self.page - 1).saturating_mul(self.per_page).min(items.len());
        let to = (from + self.per_page).min(items.len());
        &items[from..to]
    }

    /// Номера страниц с многоточиями: не больше пяти видимых номеров.
    pub fn page_numbers(&self) -> Vec<PageItem> {
        let pages = self.pages();
        let mut out = Vec::new();
        if pages <= MAX_VISIBLE {
            out.extend((1..=pages).map(PageItem::Page));
        } else if self.page <= 3 {
            out.extend((1..=4).map(PageItem::Page));
            out.push(PageItem::Ellipsis);
            out.push(PageItem::Page(pages));
        } else if self.page >= pages - 2 {
            out.push(PageItem::Page(1));
            out.push(PageItem::Ellipsis);
            out.extend((pages - 3..=pages).map(PageItem::Page));
        } else {
            out.push(PageItem::Page(1));
            out.push(PageItem::Ellipsis);
            out.extend((self.page - 1..=self.page + 1).map(PageItem::Page));
            out.push(PageItem::Ellipsis);
            out.push(PageItem::Page(pages));
        }
        out
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn pages_are_rounded_up() {
        assert_eq!(Pager::new(45, 20).pages(), 3);
        assert_eq!(Pager::new(40, 20).pages(), 2);
        assert_eq!(Pager::new(0, 20).pages(), 1);
    }

    #[test]
    fn out_of_range_page_is_noop() {
        let mut pager = Pager::new(45, 20);
        pager.set_page(2);
        assert_eq!(pager.page, 2);
        pager.set_page(4);
        assert_eq!(pager.page, 2);
        pager.set_page(0);
        assert_eq!(pager.page, 2);
    }

    #[test]
    fn edges_disable_navigation() {
        let mut pager = Pager::new(45, 20);
        assert!(!pager.has_prev());
        assert!(pager.has_next());
        pager.set_page(3);
        assert!(pager.has_prev());
        assert!(!pager.has_next());
    }

    #[test]
    fn slice_returns_current_window() {
        let items: Vec<usize> = (0..45).collect();
        let mut pager = Pager::new(items.len(), 20);
        assert_eq!(pager.slice(&items).len(), 20);
        pager.set_page(3);
        assert_eq!(pager.slice(&items), &items[40..45]);
    }

    #[test]
    fn few_pages_render_without_ellipsis() {
        let pager = Pager::new(45, 10);
        assert_eq!(
            pager.page_numbers(),
            vec![
                PageItem::Page(1),
                PageItem::Page(2),
                PageItem::Page(3),
                PageItem::Page(4),
                PageItem::Page(5)
            ]
        );
    }

    #[test]
    fn window_moves_with_current_page() {
        let mut pager = Pager::new(200, 10);
        assert_eq!(
            pager.page_numbers(),
            vec![
                PageItem::Page(1),
                PageItem::Page(2),
                PageItem::Page(3),
                PageItem::Page(4),
                PageItem::Ellipsis,
                PageItem::Page(20)
            ]
        );
        pager.set_page(10);
        assert_eq!(
            pager.page_numbers(),
            vec![
                PageItem::Page(1),
                PageItem::Ellipsis,
                PageItem::Page(9),
                PageItem::Page(10),
                PageItem::Page(11),
                PageItem::Ellipsis,
                PageItem::Page(20)
            ]
        );
        pager.set_page(19);
        assert_eq!(
            pager.page_numbers(),
            vec![
                PageItem::Page(1),
                PageItem::Ellipsis,
                PageItem::Page(17),
                PageItem::Page(18),
                PageItem::Page(19),
                PageItem::Page(20)
            ]
        );
    }

    #[test]
    fn reset_goes_back_to_first_page() {
        let mut pager = Pager::new(100, 10);
        pager.set_page(7);
        pager.reset(30);
        assert_eq!(pager.page, 1);
        assert_eq!(pager.pages(), 3);
    }
}
